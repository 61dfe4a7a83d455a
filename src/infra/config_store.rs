// ============================================================
// Layer 6 — Reader Config Store
// ============================================================
// Saves and restores a ReaderConfig as pretty-printed JSON:
//
//   {
//     "data_path": "data/preprocessed.npz",
//     "index_path": "data/indices.json",
//     "images_dir": "data/val2014",
//     "image_features_path": null,
//     "crop_features_path": null
//   }
//
// Missing fields load as None, so a file may name only the
// stores it cares about.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::reader::ReaderConfig;

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, cfg: &ReaderConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Cannot write config to '{}'", self.path.display()))?;
        tracing::debug!("Saved reader config to '{}'", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<ReaderConfig> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read config from '{}'", self.path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid reader config in '{}'", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join("reader.json"));
        let cfg   = ReaderConfig {
            data_path:  Some("records.npz".into()),
            index_path: Some("indices.json".into()),
            ..ReaderConfig::default()
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);
    }

    #[test]
    fn test_partial_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("reader.json");
        fs::write(&path, r#"{"index_path": "indices.json"}"#).unwrap();
        let cfg = ConfigStore::new(&path).load().unwrap();
        assert_eq!(cfg.index_path, Some(PathBuf::from("indices.json")));
        assert!(cfg.data_path.is_none());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigStore::new(dir.path().join("absent.json")).load().is_err());
    }
}
