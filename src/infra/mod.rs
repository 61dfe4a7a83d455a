// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File formats that sit around the dataset rather than in it:
//
//   config_store.rs — Reader configuration as JSON
//                     Saves the five store paths of a run so
//                     later runs can pass `--config` instead
//                     of repeating every flag.
//
//   hidden_store.rs — Dialogue hidden states
//                     The encoder lives upstream; its outputs
//                     arrive here as NumPy .npy matrices,
//                     one row per record.

/// ReaderConfig JSON persistence
pub mod config_store;

/// Hidden-state .npy loading
pub mod hidden_store;
