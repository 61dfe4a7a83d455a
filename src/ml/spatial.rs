// ============================================================
// Layer 5 — Spatial Encoding
// ============================================================
// Turns a pixel bounding box into the 8 numbers the Guesser
// sees for an object's position:
//
//   [x_min, y_min, x_max, y_max, x_center, y_center, w_box, h_box]
//
// Steps for a box (x, y, w, h) in an image W x H:
//   1. corners normalised to [0, 1]
//        x_min = x / W          y_min = y / H
//        x_max = (x + w) / W    y_max = (y + h) / H
//   2. w_box = x_max - x_min, h_box = y_max - y_min
//      (taken BEFORE the rescale, so they stay in [0, 1] units)
//   3. corners rescaled to [-1, 1] with v * 2 - 1
//   4. centre taken AFTER the rescale
//
// The order matters: swapping steps 2 and 3 doubles the box
// size, swapping 3 and 4 shifts every centre.
// Arithmetic runs in f64, the result is narrowed to f32.

use burn::{prelude::*, tensor::TensorData};

use crate::domain::record::{BoundingBox, ImageMeta};
use crate::ml::error::{GuesserError, GuesserResult};

/// Width of one spatial feature vector
pub const SPATIAL_DIM: usize = 8;

/// Encode one box. `width` and `height` must be positive.
pub fn encode_box(bbox: &BoundingBox, width: f64, height: f64) -> [f32; SPATIAL_DIM] {
    let x_min = bbox.x / width;
    let y_min = bbox.y / height;
    let x_max = (bbox.x + bbox.width) / width;
    let y_max = (bbox.y + bbox.height) / height;

    let w_box = x_max - x_min;
    let h_box = y_max - y_min;

    let x_min = x_min * 2.0 - 1.0;
    let y_min = y_min * 2.0 - 1.0;
    let x_max = x_max * 2.0 - 1.0;
    let y_max = y_max * 2.0 - 1.0;

    let x_center = (x_min + x_max) / 2.0;
    let y_center = (y_min + y_max) / 2.0;

    [x_min, y_min, x_max, y_max, x_center, y_center, w_box, h_box].map(|v| v as f32)
}

/// One spatial vector per box, in box order.
pub fn spatial_features(meta: &ImageMeta) -> GuesserResult<Vec<[f32; SPATIAL_DIM]>> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(meta.width) || !valid(meta.height) {
        return Err(GuesserError::InvalidImageSize { width: meta.width, height: meta.height });
    }
    Ok(meta
        .bboxes
        .iter()
        .map(|b| encode_box(b, meta.width, meta.height))
        .collect())
}

/// The spatial features as a `[boxes, 8]` tensor on `device`.
pub fn spatial_tensor<B: Backend>(meta: &ImageMeta, device: &B::Device) -> GuesserResult<Tensor<B, 2>> {
    let rows = spatial_features(meta)?;
    if rows.is_empty() {
        return Err(GuesserError::NoCandidates);
    }
    let n    = rows.len();
    let flat = rows.into_iter().flatten().collect::<Vec<f32>>();
    Ok(Tensor::from_data(TensorData::new(flat, [n, SPATIAL_DIM]), device))
}
