// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing one GuessWhat?!
// game: the image it is played on, the candidate objects,
// the dialogue and its outcome.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// The data layer fills these types from the stores,
// the ml layer turns them into tensors.

// Bounding boxes, image metadata and the full game bundle
pub mod record;

// Core abstractions (traits) that other layers implement
pub mod traits;
