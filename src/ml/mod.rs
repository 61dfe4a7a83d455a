// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that turns a game into a distribution over its
// candidate objects.
//
//   spatial.rs    — bounding box → 8-wide spatial vector
//
//   model.rs      — the Guesser:
//                   • category embedding table
//                   • Linear → ReLU → Linear into hidden-state space
//                   • dot product with the dialogue hidden state
//                   • log-softmax over the candidates
//
//   inferencer.rs — arg-max guess and target loss for one game
//
//   error.rs      — GuesserError
//
// The device is always an explicit argument; AppBackend only
// fixes which backend the binary compiles against.

/// Bounding box spatial encoding
pub mod spatial;

/// Guesser architecture and config
pub mod model;

/// Per-game guessing on top of the model
pub mod inferencer;

/// Shape and input errors
pub mod error;

/// Backend used by the `guesswhat` binary.
#[cfg(not(feature = "wgpu"))]
pub type AppBackend = burn::backend::NdArray<f32>;

/// Backend used by the `guesswhat` binary.
#[cfg(feature = "wgpu")]
pub type AppBackend = burn::backend::Wgpu;
