// ============================================================
// Layer 4 — Record Store
// ============================================================
// The parallel, index-aligned arrays produced by preprocessing.
// Row r of every array belongs to record r:
//
//   answers_training          [N, A]     answer token ids, 0 = pad
//   game_index_training       [N]        data id → image metadata
//   image_index_training      [N]        external image id
//   image_wh_training         [N, 2]     width, height in pixels
//   objects_bbox_training     [N, O, 4]  x, y, w, h; all-zero = pad
//   object_index_training     [N, O]     candidate object ids, 0 = pad
//   objects_training          [N, O]     category ids, 0 = pad
//   question_length_training  [N, Q]     tokens per question slot
//   questions_training        [N, Q, L]  question token ids
//   success_training          [N]        game outcome
//   correct_object_training   [N]        target object id
//
// Everything is loaded once, validated, and never mutated.

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Ix1, Ix2, Ix3};
use std::{
    io::{Read, Seek},
    path::Path,
};

use crate::data::error::{DataError, DataResult};
use crate::data::npz::NpzArchive;

pub const ANSWERS: &str         = "answers_training";
pub const GAME_INDEX: &str      = "game_index_training";
pub const IMAGE_INDEX: &str     = "image_index_training";
pub const IMAGE_WH: &str        = "image_wh_training";
pub const OBJECTS_BBOX: &str    = "objects_bbox_training";
pub const OBJECT_INDEX: &str    = "object_index_training";
pub const OBJECTS: &str         = "objects_training";
pub const QUESTION_LENGTH: &str = "question_length_training";
pub const QUESTIONS: &str       = "questions_training";
pub const SUCCESS: &str         = "success_training";
pub const CORRECT_OBJECT: &str  = "correct_object_training";

#[derive(Debug, Clone)]
pub struct RecordStore {
    answers:         Array2<i64>,
    game_index:      Array1<i64>,
    image_index:     Array1<i64>,
    image_wh:        Array2<f64>,
    objects_bbox:    Array3<f64>,
    object_index:    Array2<i64>,
    objects:         Array2<i64>,
    question_length: Array2<i64>,
    questions:       Array3<i64>,
    success:         Array1<i64>,
    correct_object:  Array1<i64>,
}

impl RecordStore {
    pub fn open(path: &Path) -> DataResult<Self> {
        let npz = NpzArchive::open(path, "record store")?;
        let store = Self::load(npz)?;
        tracing::info!(
            "Opened record store '{}' with {} records",
            path.display(),
            store.len()
        );
        Ok(store)
    }

    pub fn load<R: Read + Seek>(mut npz: NpzArchive<R>) -> DataResult<Self> {
        tracing::debug!("Record store arrays: {:?}", npz.names());
        let store = Self {
            answers:         npz.ints::<Ix2>(ANSWERS)?,
            game_index:      npz.ints::<Ix1>(GAME_INDEX)?,
            image_index:     npz.ints::<Ix1>(IMAGE_INDEX)?,
            image_wh:        npz.floats::<Ix2>(IMAGE_WH)?,
            objects_bbox:    npz.floats::<Ix3>(OBJECTS_BBOX)?,
            object_index:    npz.ints::<Ix2>(OBJECT_INDEX)?,
            objects:         npz.ints::<Ix2>(OBJECTS)?,
            question_length: npz.ints::<Ix2>(QUESTION_LENGTH)?,
            questions:       npz.ints::<Ix3>(QUESTIONS)?,
            success:         npz.ints::<Ix1>(SUCCESS)?,
            correct_object:  npz.ints::<Ix1>(CORRECT_OBJECT)?,
        };
        store.validate()?;
        Ok(store)
    }

    /// Check the shared record dimension and the fixed inner widths.
    fn validate(&self) -> DataResult<()> {
        let n = self.game_index.len();
        let leading = [
            (ANSWERS, self.answers.nrows()),
            (IMAGE_INDEX, self.image_index.len()),
            (IMAGE_WH, self.image_wh.nrows()),
            (OBJECTS_BBOX, self.objects_bbox.dim().0),
            (OBJECT_INDEX, self.object_index.nrows()),
            (OBJECTS, self.objects.nrows()),
            (QUESTION_LENGTH, self.question_length.nrows()),
            (QUESTIONS, self.questions.dim().0),
            (SUCCESS, self.success.len()),
            (CORRECT_OBJECT, self.correct_object.len()),
        ];
        for (name, rows) in leading {
            if rows != n {
                return Err(DataError::MalformedStore {
                    array:  name.to_string(),
                    reason: format!("{rows} records, but {GAME_INDEX} holds {n}"),
                });
            }
        }

        if self.image_wh.ncols() != 2 {
            return Err(DataError::MalformedStore {
                array:  IMAGE_WH.to_string(),
                reason: format!("expected 2 columns, got {}", self.image_wh.ncols()),
            });
        }
        if self.objects_bbox.dim().2 != 4 {
            return Err(DataError::MalformedStore {
                array:  OBJECTS_BBOX.to_string(),
                reason: format!("expected 4 coordinates per box, got {}", self.objects_bbox.dim().2),
            });
        }
        if self.question_length.ncols() != self.questions.dim().1 {
            return Err(DataError::MalformedStore {
                array:  QUESTION_LENGTH.to_string(),
                reason: format!(
                    "{} question slots, but {QUESTIONS} has {}",
                    self.question_length.ncols(),
                    self.questions.dim().1
                ),
            });
        }

        tracing::debug!(
            "Record store shapes: answers={:?} bboxes={:?} questions={:?}",
            self.answers.dim(),
            self.objects_bbox.dim(),
            self.questions.dim()
        );
        Ok(())
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.game_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail with an out-of-range error unless `record_id` is a valid row.
    pub fn check(&self, record_id: usize) -> DataResult<()> {
        if record_id < self.len() {
            Ok(())
        } else {
            Err(DataError::RecordOutOfRange { record_id, count: self.len() })
        }
    }

    pub fn answers(&self, record_id: usize) -> DataResult<ArrayView1<'_, i64>> {
        self.check(record_id)?;
        Ok(self.answers.row(record_id))
    }

    pub fn game_index(&self, record_id: usize) -> DataResult<i64> {
        self.check(record_id)?;
        Ok(self.game_index[record_id])
    }

    pub fn image_index(&self, record_id: usize) -> DataResult<i64> {
        self.check(record_id)?;
        Ok(self.image_index[record_id])
    }

    pub fn image_wh(&self, record_id: usize) -> DataResult<(f64, f64)> {
        self.check(record_id)?;
        let row = self.image_wh.row(record_id);
        Ok((row[0], row[1]))
    }

    /// Raw `[O, 4]` box matrix, padding included.
    pub fn bboxes(&self, record_id: usize) -> DataResult<ArrayView2<'_, f64>> {
        self.check(record_id)?;
        Ok(self.objects_bbox.index_axis(ndarray::Axis(0), record_id))
    }

    pub fn object_index(&self, record_id: usize) -> DataResult<ArrayView1<'_, i64>> {
        self.check(record_id)?;
        Ok(self.object_index.row(record_id))
    }

    pub fn categories(&self, record_id: usize) -> DataResult<ArrayView1<'_, i64>> {
        self.check(record_id)?;
        Ok(self.objects.row(record_id))
    }

    pub fn question_lengths(&self, record_id: usize) -> DataResult<ArrayView1<'_, i64>> {
        self.check(record_id)?;
        Ok(self.question_length.row(record_id))
    }

    /// Raw `[Q, L]` question token matrix.
    pub fn questions(&self, record_id: usize) -> DataResult<ArrayView2<'_, i64>> {
        self.check(record_id)?;
        Ok(self.questions.index_axis(ndarray::Axis(0), record_id))
    }

    /// Fixed token width `L` of every question slot.
    pub fn max_question_length(&self) -> usize {
        self.questions.dim().2
    }

    pub fn success(&self, record_id: usize) -> DataResult<bool> {
        self.check(record_id)?;
        Ok(self.success[record_id] != 0)
    }

    pub fn correct_object(&self, record_id: usize) -> DataResult<i64> {
        self.check(record_id)?;
        Ok(self.correct_object[record_id])
    }
}
