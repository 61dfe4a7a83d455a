use anyhow::{Context, Result};
use burn::data::dataset::Dataset;

use crate::domain::record::GameRecord;
use crate::domain::traits::GameSource;

/// Fully materialised games, exposed through Burn's Dataset trait.
pub struct GameDataset {
    games: Vec<GameRecord>,
}

impl GameDataset {
    pub fn new(games: Vec<GameRecord>) -> Self { Self { games } }

    /// Read every game the source knows about. Fails on the first bad record.
    pub fn from_source(source: &dyn GameSource) -> Result<Self> {
        let games = source
            .game_ids()?
            .map(|id| source.game(id).with_context(|| format!("Cannot read record {id}")))
            .collect::<Result<Vec<_>>>()?;
        tracing::info!("Loaded {} games into the dataset", games.len());
        Ok(Self::new(games))
    }

    pub fn game_count(&self) -> usize { self.games.len() }

    /// Games the guesser can be scored on: at least one candidate,
    /// and the target among them.
    pub fn scorable(&self) -> impl Iterator<Item = &GameRecord> {
        self.games
            .iter()
            .filter(|g| g.candidate_count() > 0 && g.target_index().is_some())
    }
}

impl Dataset<GameRecord> for GameDataset {
    fn get(&self, index: usize) -> Option<GameRecord> {
        self.games.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.games.len()
    }
}
