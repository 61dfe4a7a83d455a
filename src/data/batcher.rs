// ============================================================
// Layer 4 — Candidate Batcher
// ============================================================
// Converts one GameRecord into the tensors the Guesser reads.
//
//   Input:  a game with n candidate objects
//   Output: CandidateBatch with
//             spatial    [n, 8]   (ml::spatial encoding)
//             categories [n]      Int, rows of the embedding table
//             target     position of the target object, if present
//
// Every game is its own batch: candidate counts vary per
// image, and the Guesser normalises across one image only.
//
// Category ids are checked against the embedding table here,
// where they are still plain integers.

use burn::prelude::*;

use crate::domain::record::GameRecord;
use crate::ml::error::{GuesserError, GuesserResult};
use crate::ml::spatial::spatial_tensor;

// ─── CandidateBatch ───────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct CandidateBatch<B: Backend> {
    /// Spatial features — shape: [n, 8]
    pub spatial: Tensor<B, 2>,

    /// Category ids — shape: [n]
    pub categories: Tensor<B, 1, Int>,

    /// Index of the target among the n candidates
    pub target: Option<usize>,
}

impl<B: Backend> CandidateBatch<B> {
    pub fn candidate_count(&self) -> usize {
        self.categories.dims()[0]
    }
}

// ─── CandidateBatcher ─────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct CandidateBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,

    /// Size of the Guesser's category embedding table
    category_count: usize,
}

impl<B: Backend> CandidateBatcher<B> {
    pub fn new(device: B::Device, category_count: usize) -> Self {
        Self { device, category_count }
    }

    pub fn batch(&self, game: &GameRecord) -> GuesserResult<CandidateBatch<B>> {
        if game.bboxes.is_empty() && game.category_ids.is_empty() {
            return Err(GuesserError::NoCandidates);
        }
        if game.category_ids.len() != game.bboxes.len() {
            return Err(GuesserError::ShapeMismatch {
                categories: game.category_ids.len(),
                rows:       game.bboxes.len(),
            });
        }
        if game.object_ids.len() != game.bboxes.len() {
            return Err(GuesserError::CandidateMismatch {
                objects: game.object_ids.len(),
                rows:    game.bboxes.len(),
            });
        }

        let ids = game
            .category_ids
            .iter()
            .map(|&id| {
                if id < 0 || id as usize >= self.category_count {
                    Err(GuesserError::CategoryOutOfRange { id, count: self.category_count })
                } else {
                    Ok(id as i32)
                }
            })
            .collect::<GuesserResult<Vec<i32>>>()?;

        let spatial    = spatial_tensor::<B>(&game.image_meta(), &self.device)?;
        let categories = Tensor::<B, 1, Int>::from_ints(ids.as_slice(), &self.device);

        tracing::debug!(
            "Record {}: {} candidates, target position {:?}",
            game.record_id,
            ids.len(),
            game.target_index()
        );

        Ok(CandidateBatch { spatial, categories, target: game.target_index() })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_batch_shapes() {
        let (_dir, reader) = fixtures::open_reader();
        let batcher = CandidateBatcher::<TestBackend>::new(Default::default(), 6);

        let batch = batcher.batch(&reader.game(2).unwrap()).unwrap();
        assert_eq!(batch.spatial.dims(), [3, 8]);
        assert_eq!(batch.candidate_count(), 3);
        assert_eq!(batch.target, None);

        let batch = batcher.batch(&reader.game(0).unwrap()).unwrap();
        assert_eq!(batch.target, Some(1));
        let first: Vec<f32> = batch.spatial.slice([0..1, 0..8]).into_data().to_vec().unwrap();
        assert_eq!(first, vec![-0.5, -0.5, 0.5, 0.5, 0.0, 0.0, 0.5, 0.5]);
        let cats: Vec<i64> = batch.categories.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(cats, vec![2, 5]);
    }

    #[test]
    fn test_category_outside_table() {
        let (_dir, reader) = fixtures::open_reader();
        // Table too small for category 5
        let batcher = CandidateBatcher::<TestBackend>::new(Default::default(), 5);
        assert!(matches!(
            batcher.batch(&reader.game(0).unwrap()),
            Err(GuesserError::CategoryOutOfRange { id: 5, count: 5 })
        ));
    }

    #[test]
    fn test_empty_and_misaligned_games() {
        let (_dir, reader) = fixtures::open_reader();
        let batcher = CandidateBatcher::<TestBackend>::new(Default::default(), 6);

        let mut game = reader.game(0).unwrap();
        game.category_ids.pop();
        assert!(matches!(
            batcher.batch(&game),
            Err(GuesserError::ShapeMismatch { categories: 1, rows: 2 })
        ));

        let mut game = reader.game(0).unwrap();
        game.object_ids.pop();
        assert!(matches!(
            batcher.batch(&game),
            Err(GuesserError::CandidateMismatch { objects: 1, rows: 2 })
        ));

        game.category_ids.clear();
        game.bboxes.clear();
        assert!(matches!(batcher.batch(&game), Err(GuesserError::NoCandidates)));
    }
}
