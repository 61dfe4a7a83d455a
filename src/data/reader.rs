// ============================================================
// Layer 4 — Game Reader
// ============================================================
// Typed, padding-stripped views over the preprocessed dataset,
// keyed by record id.
//
// The reader is assembled from up to five inputs, each optional:
//
//   data_path            → RecordStore    (.npz)
//   index_path           → IndexDocument  (.json)
//   images_dir           → directory the image filenames live in
//   image_features_path  → FeatureStore   (whole images, by imgID2id)
//   crop_features_path   → FeatureStore   (crops, by record id)
//
// An accessor whose inputs were never opened fails with
// MissingResource instead of returning empty data.

use anyhow::Result;
use ndarray::{ArrayView1, ArrayView2, ArrayViewD};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    ops::Range,
    path::{Path, PathBuf},
};

use crate::data::error::{DataError, DataResult};
use crate::data::features::FeatureStore;
use crate::data::index::{IndexDocument, Vocabulary};
use crate::data::store::RecordStore;
use crate::domain::record::{BoundingBox, GameRecord, ImageMeta};
use crate::domain::traits::GameSource;

// ─── Reader Configuration ─────────────────────────────────────────────────────
/// Where each part of the dataset lives. Serialisable so a run can
/// be described by a single JSON file (see infra::config_store).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReaderConfig {
    pub data_path:           Option<PathBuf>,
    pub index_path:          Option<PathBuf>,
    pub images_dir:          Option<PathBuf>,
    pub image_features_path: Option<PathBuf>,
    pub crop_features_path:  Option<PathBuf>,
}

impl ReaderConfig {
    /// Fill every unset path from `other`.
    pub fn or(self, other: ReaderConfig) -> Self {
        Self {
            data_path:           self.data_path.or(other.data_path),
            index_path:          self.index_path.or(other.index_path),
            images_dir:          self.images_dir.or(other.images_dir),
            image_features_path: self.image_features_path.or(other.image_features_path),
            crop_features_path:  self.crop_features_path.or(other.crop_features_path),
        }
    }
}

/// An empty path counts as "not supplied".
fn supplied(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}

// ─── GameReader ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct GameReader {
    images_dir:     Option<PathBuf>,
    index:          Option<IndexDocument>,
    records:        Option<RecordStore>,
    image_features: Option<FeatureStore>,
    crop_features:  Option<FeatureStore>,
}

impl GameReader {
    /// Open every store named in `config`.
    pub fn open(config: &ReaderConfig) -> DataResult<Self> {
        let index = supplied(&config.index_path)
            .map(IndexDocument::open)
            .transpose()?;
        let records = supplied(&config.data_path)
            .map(RecordStore::open)
            .transpose()?;
        let image_features = supplied(&config.image_features_path)
            .map(|p| FeatureStore::open(p, "image feature store"))
            .transpose()?;
        let crop_features = supplied(&config.crop_features_path)
            .map(|p| FeatureStore::open(p, "crop feature store"))
            .transpose()?;

        Ok(Self {
            images_dir: supplied(&config.images_dir).map(Path::to_path_buf),
            index,
            records,
            image_features,
            crop_features,
        })
    }

    fn records(&self) -> DataResult<&RecordStore> {
        self.records.as_ref().ok_or(DataError::MissingResource("record store"))
    }

    fn index(&self) -> DataResult<&IndexDocument> {
        self.index.as_ref().ok_or(DataError::MissingResource("index document"))
    }

    fn vocabulary(&self) -> DataResult<&Vocabulary> {
        Ok(self.index()?.vocabulary())
    }

    // ── Vocabulary and categories ─────────────────────────────────────────────

    pub fn word_to_id(&self) -> DataResult<&HashMap<String, i64>> {
        Ok(self.vocabulary()?.word_to_id())
    }

    pub fn id_to_word(&self) -> DataResult<&HashMap<i64, String>> {
        Ok(self.vocabulary()?.id_to_word())
    }

    /// `1 + max category id`; the embedding table needs this many rows.
    pub fn category_count(&self) -> DataResult<usize> {
        Ok(self.index()?.categories().count())
    }

    pub fn category_to_id(&self) -> DataResult<&HashMap<String, i64>> {
        Ok(self.index()?.categories().name_to_id())
    }

    pub fn id_to_category(&self) -> DataResult<&BTreeMap<i64, String>> {
        Ok(self.index()?.categories().id_to_name())
    }

    pub fn category_name(&self, category_id: i64) -> DataResult<&str> {
        self.index()?.categories().name(category_id)
    }

    // ── Record enumeration ────────────────────────────────────────────────────

    pub fn record_count(&self) -> DataResult<usize> {
        Ok(self.records()?.len())
    }

    /// Every valid record id, `0..record_count`.
    pub fn all_record_ids(&self) -> DataResult<Range<usize>> {
        Ok(0..self.records()?.len())
    }

    /// The object the questioner had in mind.
    pub fn target_object(&self, record_id: usize) -> DataResult<i64> {
        self.records()?.correct_object(record_id)
    }

    pub fn success(&self, record_id: usize) -> DataResult<bool> {
        self.records()?.success(record_id)
    }

    // ── Image ─────────────────────────────────────────────────────────────────

    pub fn image_id(&self, record_id: usize) -> DataResult<i64> {
        self.records()?.image_index(record_id)
    }

    pub fn image_path(&self, record_id: usize) -> DataResult<PathBuf> {
        let data_id = self.records()?.game_index(record_id)?;
        let meta    = self.index()?.image(data_id)?;
        let dir     = self
            .images_dir
            .as_ref()
            .ok_or(DataError::MissingResource("image directory"))?;
        Ok(dir.join(&meta.filename))
    }

    pub fn image_url(&self, record_id: usize) -> DataResult<String> {
        let data_id = self.records()?.game_index(record_id)?;
        Ok(self.index()?.image(data_id)?.url.clone())
    }

    /// `(width, height)` in pixels
    pub fn image_dimensions(&self, record_id: usize) -> DataResult<(f64, f64)> {
        self.records()?.image_wh(record_id)
    }

    /// Whole-image features, looked up through the image id.
    pub fn image_features(&self, record_id: usize) -> DataResult<ArrayViewD<'_, f32>> {
        let store = self
            .image_features
            .as_ref()
            .ok_or(DataError::MissingResource("image feature store"))?;
        let image_id = self.image_id(record_id)?;
        let row      = self.index()?.feature_row(image_id)?;
        store.row(row)
    }

    /// Crop features are stored in record order, no indirection.
    pub fn crop_features(&self, record_id: usize) -> DataResult<ArrayViewD<'_, f32>> {
        self.crop_features
            .as_ref()
            .ok_or(DataError::MissingResource("crop feature store"))?
            .row(record_id)
    }

    // ── Dialogue ──────────────────────────────────────────────────────────────

    /// One string per non-empty question slot, tokens joined by single spaces.
    pub fn questions(&self, record_id: usize) -> DataResult<Vec<String>> {
        let records = self.records()?;
        let vocab   = self.vocabulary()?;
        let lengths = records.question_lengths(record_id)?;
        let tokens  = records.questions(record_id)?;
        let width   = records.max_question_length();

        let mut questions = Vec::new();
        for (slot, (&len, row)) in lengths.iter().zip(tokens.outer_iter()).enumerate() {
            if len < 0 {
                return Err(DataError::MalformedStore {
                    array:  crate::data::store::QUESTION_LENGTH.to_string(),
                    reason: format!("record {record_id} slot {slot} declares {len} tokens"),
                });
            }
            if len == 0 {
                continue;
            }
            let len = len as usize;
            if len > width {
                return Err(DataError::MalformedStore {
                    array:  crate::data::store::QUESTION_LENGTH.to_string(),
                    reason: format!(
                        "record {record_id} slot {slot} declares {len} tokens, width is {width}"
                    ),
                });
            }
            let words = row
                .iter()
                .take(len)
                .map(|&id| vocab.word(id))
                .collect::<DataResult<Vec<_>>>()?;
            questions.push(words.join(" "));
        }
        Ok(questions)
    }

    /// Raw `[slots, max_question_length]` token ids, padding included.
    pub fn question_token_ids(&self, record_id: usize) -> DataResult<ArrayView2<'_, i64>> {
        self.records()?.questions(record_id)
    }

    pub fn max_question_length(&self) -> DataResult<usize> {
        Ok(self.records()?.max_question_length())
    }

    pub fn answers(&self, record_id: usize) -> DataResult<Vec<String>> {
        let vocab = self.vocabulary()?;
        self.records()?
            .answers(record_id)?
            .iter()
            .filter(|&&id| id != 0)
            .map(|&id| vocab.word(id).map(str::to_string))
            .collect()
    }

    pub fn answer_token_ids(&self, record_id: usize) -> DataResult<ArrayView1<'_, i64>> {
        self.records()?.answers(record_id)
    }

    // ── Candidate objects ─────────────────────────────────────────────────────

    pub fn object_ids(&self, record_id: usize) -> DataResult<Vec<i64>> {
        Ok(non_zero(self.records()?.object_index(record_id)?))
    }

    /// Boxes aligned with `object_ids`, all-zero padding removed.
    pub fn object_bboxes(&self, record_id: usize) -> DataResult<Vec<BoundingBox>> {
        Ok(self
            .records()?
            .bboxes(record_id)?
            .outer_iter()
            .map(|b| BoundingBox::new(b[0], b[1], b[2], b[3]))
            .filter(|b| !b.is_padding())
            .collect())
    }

    pub fn image_meta(&self, record_id: usize) -> DataResult<ImageMeta> {
        let bboxes          = self.object_bboxes(record_id)?;
        let (width, height) = self.image_dimensions(record_id)?;
        Ok(ImageMeta::new(bboxes, width, height))
    }

    pub fn category_ids(&self, record_id: usize) -> DataResult<Vec<i64>> {
        Ok(non_zero(self.records()?.categories(record_id)?))
    }

    /// Everything about one record, with the candidate lists checked
    /// to be the same length.
    pub fn game(&self, record_id: usize) -> DataResult<GameRecord> {
        let object_ids      = self.object_ids(record_id)?;
        let bboxes          = self.object_bboxes(record_id)?;
        let category_ids    = self.category_ids(record_id)?;
        let (width, height) = self.image_dimensions(record_id)?;

        if object_ids.len() != bboxes.len() || object_ids.len() != category_ids.len() {
            return Err(DataError::MisalignedRecord {
                record_id,
                objects:    object_ids.len(),
                bboxes:     bboxes.len(),
                categories: category_ids.len(),
            });
        }

        let game = GameRecord {
            record_id,
            image_id: self.image_id(record_id)?,
            width,
            height,
            questions: self.questions(record_id)?,
            answers: self.answers(record_id)?,
            object_ids,
            bboxes,
            category_ids,
            target_object: self.target_object(record_id)?,
            success: self.success(record_id)?,
        };
        if game.target_index().is_none() {
            tracing::warn!(
                "Record {} targets object {} which is not among its candidates",
                record_id,
                game.target_object
            );
        }
        Ok(game)
    }
}

fn non_zero(values: ArrayView1<'_, i64>) -> Vec<i64> {
    values.iter().copied().filter(|&v| v != 0).collect()
}

impl GameSource for GameReader {
    fn game_ids(&self) -> Result<Range<usize>> {
        Ok(self.all_record_ids()?)
    }

    fn game(&self, record_id: usize) -> Result<GameRecord> {
        Ok(GameReader::game(self, record_id)?)
    }
}
