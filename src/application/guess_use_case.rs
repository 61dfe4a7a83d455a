// ============================================================
// Layer 2 — GuessUseCase
// ============================================================
// Runs the Guesser over records of the dataset:
//
//   Step 1: Open the dataset                      (Layer 4 - data)
//   Step 2: Load the encoder hidden states        (Layer 6 - infra)
//   Step 3: Build the Guesser for that width      (Layer 5 - ml)
//   Step 4: Batch each record's candidates        (Layer 4 - data)
//   Step 5: Score, pick, compare with the target  (Layer 5 - ml)
//
// Without a saved GuesserConfig the model starts from fresh
// parameters, so guesses exercise the pipeline rather than
// reflect a trained model.

use anyhow::{bail, ensure, Context, Result};
use burn::{config::Config, prelude::*, tensor::TensorData};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::dataset::GameDataset;
use crate::data::reader::{GameReader, ReaderConfig};
use crate::infra::hidden_store::load_hidden_states;
use crate::ml::inferencer::{GuessOutcome, Inferencer};
use crate::ml::model::GuesserConfig;
use crate::ml::AppBackend;

// ─── Guess Configuration ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessConfig {
    pub reader:               ReaderConfig,
    pub hidden_states:        PathBuf,
    pub object_embedding_dim: usize,
    pub mlp_hidden_dim:       usize,
    /// Saved GuesserConfig; overrides the two dims above
    pub guesser_config:       Option<PathBuf>,
    /// Where to write the GuesserConfig actually used
    pub save_guesser_config:  Option<PathBuf>,
    pub seed:                 Option<u64>,
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            reader:               ReaderConfig::default(),
            hidden_states:        PathBuf::from("hidden_states.npy"),
            object_embedding_dim: 20,
            mlp_hidden_dim:       64,
            guesser_config:       None,
            save_guesser_config:  None,
            seed:                 None,
        }
    }
}

/// Accuracy and loss over every scorable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub games:     usize,
    pub scored:    usize,
    pub correct:   usize,
    pub mean_loss: f64,
}

impl EvaluationSummary {
    pub fn accuracy(&self) -> f64 {
        if self.scored > 0 { self.correct as f64 / self.scored as f64 } else { 0.0 }
    }
}

// ─── GuessUseCase ─────────────────────────────────────────────────────────────
pub struct GuessUseCase {
    config:     GuessConfig,
    reader:     GameReader,
    states:     Array2<f32>,
    inferencer: Inferencer<AppBackend>,
}

impl GuessUseCase {
    pub fn new(config: GuessConfig) -> Result<Self> {
        // ── Step 1: Open the dataset ──────────────────────────────────────────
        let reader = GameReader::open(&config.reader).context("Cannot open the dataset")?;

        // ── Step 2: Load hidden states ────────────────────────────────────────
        let states = load_hidden_states(&config.hidden_states)?;
        let hidden_dim = states.ncols();

        // ── Step 3: Build the Guesser ─────────────────────────────────────────
        let model_cfg = match &config.guesser_config {
            Some(path) => GuesserConfig::load(path).map_err(|e| {
                anyhow::anyhow!("Cannot load Guesser config '{}': {e}", path.display())
            })?,
            None => GuesserConfig::new(
                hidden_dim,
                reader.category_count()?,
                config.object_embedding_dim,
            )
            .with_mlp_hidden_dim(config.mlp_hidden_dim),
        };
        ensure!(
            model_cfg.hidden_encoder_dim == hidden_dim,
            "Guesser expects hidden states of width {}, '{}' holds width {}",
            model_cfg.hidden_encoder_dim,
            config.hidden_states.display(),
            hidden_dim
        );
        if let Some(path) = &config.save_guesser_config {
            model_cfg
                .save(path)
                .with_context(|| format!("Cannot write Guesser config to '{}'", path.display()))?;
        }

        if let Some(seed) = config.seed {
            <AppBackend as Backend>::seed(seed);
        }
        let device = <AppBackend as Backend>::Device::default();
        let model  = model_cfg.init::<AppBackend>(&device);
        tracing::info!(
            "Guesser ready: hidden={}, categories={}, embedding={}, mlp={}",
            model_cfg.hidden_encoder_dim,
            model_cfg.category_count,
            model_cfg.object_embedding_dim,
            model_cfg.mlp_hidden_dim
        );

        Ok(Self { config, reader, states, inferencer: Inferencer::new(model, device) })
    }

    /// A single stored state is shared by every record; otherwise
    /// row r belongs to record r.
    fn hidden_row(&self, record_id: usize) -> Result<ArrayView1<'_, f32>> {
        match self.states.nrows() {
            1 => Ok(self.states.row(0)),
            n if record_id < n => Ok(self.states.row(record_id)),
            n => bail!(
                "No hidden state for record {record_id}: '{}' holds {n} rows",
                self.config.hidden_states.display()
            ),
        }
    }

    fn hidden_tensor(&self, record_id: usize) -> Result<Tensor<AppBackend, 2>> {
        let row  = self.hidden_row(record_id)?;
        let data = TensorData::new(row.to_vec(), [1, row.len()]);
        Ok(Tensor::from_data(data, self.inferencer.device()))
    }

    // ── Steps 4-5 for one record ──────────────────────────────────────────────
    pub fn guess(&self, record_id: usize) -> Result<GuessOutcome> {
        let game = self
            .reader
            .game(record_id)
            .with_context(|| format!("Cannot read record {record_id}"))?;
        let hidden = self.hidden_tensor(record_id)?;
        self.inferencer
            .guess(&game, hidden)
            .with_context(|| format!("Cannot score record {record_id}"))
    }

    // ── Steps 4-5 for every record ────────────────────────────────────────────
    pub fn evaluate(&self) -> Result<EvaluationSummary> {
        let dataset = GameDataset::from_source(&self.reader)?;

        let mut scored   = 0usize;
        let mut correct  = 0usize;
        let mut loss_sum = 0.0f64;
        for game in dataset.scorable() {
            let outcome = self.inferencer.guess(game, self.hidden_tensor(game.record_id)?)?;
            let loss    = self.inferencer.target_loss(game, self.hidden_tensor(game.record_id)?)?;
            scored   += 1;
            correct  += usize::from(outcome.correct);
            loss_sum += f64::from(loss);
        }

        let summary = EvaluationSummary {
            games:     dataset.game_count(),
            scored,
            correct,
            mean_loss: if scored > 0 { loss_sum / scored as f64 } else { f64::NAN },
        };
        tracing::info!(
            "Evaluated {} of {} games: accuracy={:.1}% mean_loss={:.4}",
            summary.scored,
            summary.games,
            summary.accuracy() * 100.0,
            summary.mean_loss
        );
        Ok(summary)
    }
}
