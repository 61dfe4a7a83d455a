//! Errors raised while building Guesser inputs or scoring candidates.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuesserError {
    #[error("{categories} category ids for {rows} spatial feature rows")]
    ShapeMismatch { categories: usize, rows: usize },

    #[error("{objects} object ids for {rows} candidate boxes")]
    CandidateMismatch { objects: usize, rows: usize },

    #[error("spatial features have width {got}, expected {expected}")]
    SpatialWidth { expected: usize, got: usize },

    #[error("hidden state has width {got}, expected {expected}")]
    HiddenDim { expected: usize, got: usize },

    #[error("hidden state batch is empty")]
    EmptyHiddenState,

    #[error("no candidate objects to score")]
    NoCandidates,

    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: f64, height: f64 },

    #[error("category id {id} outside the embedding table (0..{count})")]
    CategoryOutOfRange { id: i64, count: usize },

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("target position {target} outside {candidates} candidates")]
    TargetOutOfRange { target: usize, candidates: usize },

    #[error("no target among the candidates")]
    MissingTarget,

    #[error("cannot read tensor data: {0}")]
    TensorData(String),
}

pub type GuesserResult<T> = Result<T, GuesserError>;
