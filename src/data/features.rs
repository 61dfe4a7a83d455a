// ============================================================
// Layer 4 — Pre-extracted Feature Stores
// ============================================================
// Two independent stores share this layout:
//
//   all_img_ids       [M]       id of the image each row was extracted from
//   all_img_features  [M, ...]  one feature block per row
//
// The whole-image store is addressed through imgID2id,
// the crop store directly by record id.

use ndarray::{ArrayD, ArrayViewD, Array1, Axis, Ix1, IxDyn};
use std::{
    io::{Read, Seek},
    path::Path,
};

use crate::data::error::{DataError, DataResult};
use crate::data::npz::NpzArchive;

pub const IMAGE_IDS: &str = "all_img_ids";
pub const FEATURES: &str  = "all_img_features";

#[derive(Debug, Clone)]
pub struct FeatureStore {
    label:     &'static str,
    image_ids: Array1<i64>,
    features:  ArrayD<f32>,
}

impl FeatureStore {
    pub fn open(path: &Path, label: &'static str) -> DataResult<Self> {
        let npz   = NpzArchive::open(path, label)?;
        let store = Self::load(npz, label)?;
        tracing::info!(
            "Opened {} '{}': {} rows of shape {:?}",
            label,
            path.display(),
            store.len(),
            store.feature_shape()
        );
        Ok(store)
    }

    pub fn load<R: Read + Seek>(mut npz: NpzArchive<R>, label: &'static str) -> DataResult<Self> {
        let image_ids = npz.ints::<Ix1>(IMAGE_IDS)?;
        let features  = npz.floats32::<IxDyn>(FEATURES)?;

        let rows = features.shape().first().copied().unwrap_or(0);
        if features.ndim() == 0 || rows != image_ids.len() {
            return Err(DataError::MalformedStore {
                array:  FEATURES.to_string(),
                reason: format!("{rows} feature rows for {} image ids", image_ids.len()),
            });
        }
        Ok(Self { label, image_ids, features })
    }

    pub fn len(&self) -> usize {
        self.image_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_ids.is_empty()
    }

    /// Shape of a single row, e.g. `[2048]` or `[7, 7, 2048]`.
    pub fn feature_shape(&self) -> &[usize] {
        &self.features.shape()[1..]
    }

    pub fn row(&self, row: usize) -> DataResult<ArrayViewD<'_, f32>> {
        if row >= self.len() {
            return Err(DataError::RowOutOfRange { store: self.label, row, rows: self.len() });
        }
        Ok(self.features.index_axis(Axis(0), row))
    }
}
