// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Picks the Guesser's answer for one game: batch the game's
// candidates, score them against the hidden state, take the
// arg-max and compare it with the recorded target.

use burn::prelude::*;

use crate::data::batcher::CandidateBatcher;
use crate::domain::record::GameRecord;
use crate::ml::error::{GuesserError, GuesserResult};
use crate::ml::model::Guesser;

/// What the Guesser chose for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessOutcome {
    pub record_id:  usize,
    /// One log-probability per candidate, in candidate order
    pub log_probs:  Vec<f32>,
    pub best_index: usize,
    pub object_id:  i64,
    pub correct:    bool,
}

impl GuessOutcome {
    pub fn confidence(&self) -> f32 {
        self.log_probs[self.best_index].exp()
    }
}

pub struct Inferencer<B: Backend> {
    model:   Guesser<B>,
    batcher: CandidateBatcher<B>,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: Guesser<B>, device: B::Device) -> Self {
        let batcher = CandidateBatcher::new(device, model.category_count);
        Self { model, batcher }
    }

    pub fn device(&self) -> &B::Device {
        &self.batcher.device
    }

    /// hidden: [batch, hidden_encoder_dim], row 0 is the dialogue state
    pub fn guess(&self, game: &GameRecord, hidden: Tensor<B, 2>) -> GuesserResult<GuessOutcome> {
        let batch  = self.batcher.batch(game)?;
        let scores = self.model.forward(hidden, batch.spatial, batch.categories)?;
        let log_probs = scores
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| GuesserError::TensorData(format!("{e:?}")))?;

        let best_index = log_probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .ok_or(GuesserError::NoCandidates)?;
        let object_id = *game.object_ids.get(best_index).ok_or(GuesserError::CandidateMismatch {
            objects: game.object_ids.len(),
            rows:    log_probs.len(),
        })?;

        tracing::debug!(
            "Record {}: guessed object {} (p={:.4}), target {}",
            game.record_id,
            object_id,
            log_probs[best_index].exp(),
            game.target_object
        );

        Ok(GuessOutcome {
            record_id: game.record_id,
            log_probs,
            best_index,
            object_id,
            correct: object_id == game.target_object,
        })
    }

    /// Cross-entropy of the game's target under the current parameters.
    pub fn target_loss(&self, game: &GameRecord, hidden: Tensor<B, 2>) -> GuesserResult<f32> {
        let batch  = self.batcher.batch(game)?;
        let target = batch.target.ok_or(GuesserError::MissingTarget)?;
        let loss   = self
            .model
            .forward_loss(hidden, batch.spatial, batch.categories, target)?;
        loss.into_data()
            .to_vec::<f32>()
            .map_err(|e| GuesserError::TensorData(format!("{e:?}")))?
            .first()
            .copied()
            .ok_or(GuesserError::NoCandidates)
    }
}
