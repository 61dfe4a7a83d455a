//! Errors raised by the data access layer.
//!
//! Every variant is a programmer or data-integrity error. Callers are expected
//! to propagate them, never to substitute a default value.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("{0} was not opened; pass its path when constructing the reader")]
    MissingResource(&'static str),

    #[error("record id {record_id} out of range (store holds {count} records)")]
    RecordOutOfRange { record_id: usize, count: usize },

    #[error("row {row} out of range for {store} ({rows} rows)")]
    RowOutOfRange { store: &'static str, row: usize, rows: usize },

    #[error("key '{key}' not found in {mapping}")]
    MissingKey { mapping: &'static str, key: String },

    #[error("malformed store array '{array}': {reason}")]
    MalformedStore { array: String, reason: String },

    #[error("malformed index section '{section}': {reason}")]
    MalformedIndex { section: &'static str, reason: String },

    #[error(
        "record {record_id} is misaligned: {objects} object ids, \
         {bboxes} boxes, {categories} category ids"
    )]
    MisalignedRecord {
        record_id:  usize,
        objects:    usize,
        bboxes:     usize,
        categories: usize,
    },

    #[error("cannot open '{path}': {source}")]
    Open {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NPZ error: {0}")]
    Npz(#[from] ndarray_npy::ReadNpzError),
}

pub type DataResult<T> = Result<T, DataError>;
