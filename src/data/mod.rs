// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the preprocessed files on disk and the
// tensors the Guesser reads:
//
//   records.npz  indices.json  image_features.npz  crop_features.npz
//        │             │               │                  │
//        ▼             ▼               ▼                  ▼
//   RecordStore   IndexDocument   FeatureStore       FeatureStore
//        └─────────────┴───────┬───────┴──────────────────┘
//                              ▼
//                          GameReader      → typed per-record accessors
//                              │
//                              ▼
//                          GameDataset     → implements Burn's Dataset trait
//                              │
//                              ▼
//                       CandidateBatcher   → spatial + category tensors
//
// All stores are read once at open and never mutated.

/// Typed errors for this layer
pub mod error;

/// .npz archive access with dtype widening
pub mod npz;

/// The parallel per-record arrays
pub mod store;

/// Vocabulary, categories and image metadata from the JSON index
pub mod index;

/// Whole-image and crop feature stores
pub mod features;

/// Per-record accessors over all of the above
pub mod reader;

/// Implements Burn's Dataset trait for games
pub mod dataset;

/// Turns a game into Guesser input tensors
pub mod batcher;

#[cfg(test)]
pub(crate) mod fixtures;
