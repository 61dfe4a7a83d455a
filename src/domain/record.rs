// ============================================================
// Layer 3 — Game Record Domain Types
// ============================================================
// One GuessWhat?! game, as plain data:
//
//   image      → id, width, height
//   candidates → object ids, bounding boxes, category ids
//                (index-aligned: candidate i is (ids[i], bboxes[i], categories[i]))
//   dialogue   → questions and answers as words
//   outcome    → which object was the target, did the guesser succeed
//
// Bounding boxes are in pixels, (x, y) is the top-left corner.

use serde::{Deserialize, Serialize};

/// An object's bounding box in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x:      f64,
    pub y:      f64,
    pub width:  f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// All-zero boxes pad the per-record object list; they are not objects.
    pub fn is_padding(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.width == 0.0 && self.height == 0.0
    }
}

/// Everything the spatial encoder needs about one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub bboxes: Vec<BoundingBox>,
    pub width:  f64,
    pub height: f64,
}

impl ImageMeta {
    pub fn new(bboxes: Vec<BoundingBox>, width: f64, height: f64) -> Self {
        Self { bboxes, width, height }
    }
}

/// A complete game with padding already stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub record_id:     usize,
    pub image_id:      i64,
    pub width:         f64,
    pub height:        f64,
    pub questions:     Vec<String>,
    pub answers:       Vec<String>,
    pub object_ids:    Vec<i64>,
    pub bboxes:        Vec<BoundingBox>,
    pub category_ids:  Vec<i64>,
    pub target_object: i64,
    pub success:       bool,
}

impl GameRecord {
    /// Number of candidate objects in the image
    pub fn candidate_count(&self) -> usize {
        self.object_ids.len()
    }

    pub fn image_meta(&self) -> ImageMeta {
        ImageMeta::new(self.bboxes.clone(), self.width, self.height)
    }

    /// Position of the target among the candidates, if it is one of them.
    pub fn target_index(&self) -> Option<usize> {
        self.object_ids.iter().position(|&id| id == self.target_object)
    }

    /// Questions paired with their answers, in dialogue order.
    /// Stops at the shorter of the two lists.
    pub fn dialogue(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .map(|(q, a)| (q.as_str(), a.as_str()))
    }
}
