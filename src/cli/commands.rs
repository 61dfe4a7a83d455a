// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `inspect`, `guess` and
// `evaluate`, and all their configurable flags.
//
// Every command shares the dataset flags in StoreArgs. A
// `--config` JSON file can supply any of them; flags given on
// the command line win over the file.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::guess_use_case::GuessConfig;
use crate::data::reader::ReaderConfig;
use crate::infra::config_store::ConfigStore;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the dialogue, objects and image of one record
    Inspect(InspectArgs),

    /// Let the Guesser pick an object for one record
    Guess(GuessArgs),

    /// Run the Guesser over every record and report accuracy
    Evaluate(EvaluateArgs),
}

// ─── Dataset Flags ────────────────────────────────────────────────────────────
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Preprocessed record store (.npz)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Index document with vocabulary, categories and image metadata (.json)
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Directory holding the image files named in the index
    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    /// Whole-image feature store (.npz)
    #[arg(long)]
    pub image_features: Option<PathBuf>,

    /// Per-record crop feature store (.npz)
    #[arg(long)]
    pub crop_features: Option<PathBuf>,

    /// JSON file with default paths for the flags above
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the resolved paths to this JSON file
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

impl StoreArgs {
    /// Merge the flags with `--config`, then honour `--save-config`.
    pub fn resolve(&self) -> Result<ReaderConfig> {
        let flags = ReaderConfig {
            data_path:           self.data.clone(),
            index_path:          self.index.clone(),
            images_dir:          self.images_dir.clone(),
            image_features_path: self.image_features.clone(),
            crop_features_path:  self.crop_features.clone(),
        };
        let resolved = match &self.config {
            Some(path) => flags.or(ConfigStore::new(path).load()?),
            None       => flags,
        };
        if let Some(path) = &self.save_config {
            ConfigStore::new(path).save(&resolved)?;
            tracing::info!("Reader config written to '{}'", path.display());
        }
        Ok(resolved)
    }
}

// ─── Inspect ──────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Record to show; all records when omitted
    #[arg(long)]
    pub record_id: Option<usize>,
}

// ─── Guesser Flags ────────────────────────────────────────────────────────────
#[derive(Args, Debug, Clone)]
pub struct GuesserArgs {
    /// Width of each category embedding
    #[arg(long, default_value_t = 20)]
    pub object_embedding_dim: usize,

    /// Width of the MLP between object features and hidden-state space
    #[arg(long, default_value_t = 64)]
    pub mlp_hidden_dim: usize,

    /// Saved Guesser config (.json); overrides the two widths above
    #[arg(long)]
    pub guesser_config: Option<PathBuf>,

    /// Write the Guesser config used by this run
    #[arg(long)]
    pub save_guesser_config: Option<PathBuf>,

    /// Seed for the backend's parameter initialisation
    #[arg(long)]
    pub seed: Option<u64>,
}

impl GuesserArgs {
    fn into_config(self, reader: ReaderConfig, hidden_states: PathBuf) -> GuessConfig {
        GuessConfig {
            reader,
            hidden_states,
            object_embedding_dim: self.object_embedding_dim,
            mlp_hidden_dim:       self.mlp_hidden_dim,
            guesser_config:       self.guesser_config,
            save_guesser_config:  self.save_guesser_config,
            seed:                 self.seed,
        }
    }
}

// ─── Guess ────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct GuessArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub guesser: GuesserArgs,

    /// Record to guess on
    #[arg(long)]
    pub record_id: usize,

    /// Dialogue hidden state(s) as .npy: [H], [1, H] or one row per record
    #[arg(long)]
    pub hidden_state: PathBuf,
}

impl TryFrom<GuessArgs> for GuessConfig {
    type Error = anyhow::Error;

    fn try_from(a: GuessArgs) -> Result<Self> {
        let reader = a.store.resolve()?;
        Ok(a.guesser.into_config(reader, a.hidden_state))
    }
}

// ─── Evaluate ─────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub guesser: GuesserArgs,

    /// Hidden states as .npy, one row per record
    #[arg(long)]
    pub hidden_states: PathBuf,
}

impl TryFrom<EvaluateArgs> for GuessConfig {
    type Error = anyhow::Error;

    fn try_from(a: EvaluateArgs) -> Result<Self> {
        let reader = a.store.resolve()?;
        Ok(a.guesser.into_config(reader, a.hidden_states))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_parse_guess() {
        let cli = Cli::try_parse_from([
            "guesswhat", "guess",
            "--data", "records.npz",
            "--index", "indices.json",
            "--record-id", "4",
            "--hidden-state", "h.npy",
            "--seed", "1",
        ])
        .unwrap();
        let Commands::Guess(args) = cli.command else { panic!("expected guess") };
        assert_eq!(args.record_id, 4);
        assert_eq!(args.guesser.object_embedding_dim, 20);
        assert_eq!(args.guesser.mlp_hidden_dim, 64);

        let cfg = GuessConfig::try_from(args).unwrap();
        assert_eq!(cfg.reader.data_path, Some(PathBuf::from("records.npz")));
        assert_eq!(cfg.hidden_states, PathBuf::from("h.npy"));
        assert_eq!(cfg.seed, Some(1));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir  = tempfile::tempdir().unwrap();
        let file = dir.path().join("reader.json");
        ConfigStore::new(&file)
            .save(&ReaderConfig {
                data_path:  Some("from_file.npz".into()),
                index_path: Some("from_file.json".into()),
                ..ReaderConfig::default()
            })
            .unwrap();

        let saved = dir.path().join("resolved.json");
        let args  = StoreArgs {
            data:        Some("from_flag.npz".into()),
            config:      Some(file),
            save_config: Some(saved.clone()),
            ..StoreArgs::default()
        };
        let cfg = args.resolve().unwrap();
        assert_eq!(cfg.data_path, Some(PathBuf::from("from_flag.npz")));
        assert_eq!(cfg.index_path, Some(PathBuf::from("from_file.json")));
        assert_eq!(ConfigStore::new(&saved).load().unwrap(), cfg);
    }

    #[test]
    fn test_guess_requires_hidden_state() {
        assert!(Cli::try_parse_from(["guesswhat", "guess", "--record-id", "0"]).is_err());
    }
}
