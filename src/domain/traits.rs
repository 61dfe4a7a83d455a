// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The dataset adapter and the CLI only need "give me the ids"
// and "give me game N". GameReader implements this over the
// preprocessed stores; tests implement it over in-memory games.

use anyhow::Result;
use std::ops::Range;

use crate::domain::record::GameRecord;

// ─── GameSource ───────────────────────────────────────────────────────────────
/// Any component that can hand out complete games by record id.
///
/// Implementations:
///   - GameReader → reads the preprocessed record store and index
pub trait GameSource {
    /// All valid record ids, in order. Calling it again restarts the sequence.
    fn game_ids(&self) -> Result<Range<usize>>;

    /// The full game bundle for one record id.
    fn game(&self, record_id: usize) -> Result<GameRecord>;
}
