// ============================================================
// Layer 4 — NPZ Archive Access
// ============================================================
// The record store and both feature stores are NumPy .npz
// archives: a ZIP of .npy files, one per named array.
//
// The preprocessing stage does not pin element types, so the
// readers here accept any integer layout NumPy commonly emits
// and widen it:
//
//   ints()    → i64  (from i64, i32, u16, u8, bool)
//   floats()  → f64  (from f64, f32, i64, i32)
//   floats32()→ f32  (from f32, f64)
//
// Array names are accepted with or without the ".npy" suffix.

use ndarray::{Array, Dimension};
use ndarray_npy::{NpzReader, ReadNpzError, ReadableElement};
use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

use crate::data::error::{DataError, DataResult};

/// An opened .npz archive plus a label used in error messages.
pub struct NpzArchive<R: Read + Seek> {
    label:  &'static str,
    reader: NpzReader<R>,
    names:  Vec<String>,
}

impl NpzArchive<File> {
    /// Open the archive at `path`. `label` names the store in errors,
    /// e.g. "record store" or "crop feature store".
    pub fn open(path: &Path, label: &'static str) -> DataResult<Self> {
        let file = File::open(path).map_err(|source| DataError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, label)
    }
}

impl<R: Read + Seek> NpzArchive<R> {
    pub fn from_reader(reader: R, label: &'static str) -> DataResult<Self> {
        let mut reader = NpzReader::new(reader)?;
        let names = reader
            .names()?
            .into_iter()
            .map(|n| n.trim_end_matches(".npy").to_string())
            .collect();
        Ok(Self { label, reader, names })
    }

    /// Array names in the archive, without the ".npy" suffix.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, key: &str) -> bool {
        self.names.iter().any(|n| n == key)
    }

    /// Read an integer array of rank `D`, widened to i64.
    pub fn ints<D: Dimension>(&mut self, key: &str) -> DataResult<Array<i64, D>> {
        self.ensure_present(key)?;
        if let Ok(a) = self.read::<i64, D>(key) {
            return Ok(a);
        }
        if let Ok(a) = self.read::<i32, D>(key) {
            return Ok(a.mapv(i64::from));
        }
        if let Ok(a) = self.read::<u16, D>(key) {
            return Ok(a.mapv(i64::from));
        }
        if let Ok(a) = self.read::<u8, D>(key) {
            return Ok(a.mapv(i64::from));
        }
        self.read::<bool, D>(key)
            .map(|a| a.mapv(i64::from))
            .map_err(|e| malformed(key, "an integer array", e))
    }

    /// Read a real-valued array of rank `D`, widened to f64.
    pub fn floats<D: Dimension>(&mut self, key: &str) -> DataResult<Array<f64, D>> {
        self.ensure_present(key)?;
        if let Ok(a) = self.read::<f64, D>(key) {
            return Ok(a);
        }
        if let Ok(a) = self.read::<f32, D>(key) {
            return Ok(a.mapv(f64::from));
        }
        if let Ok(a) = self.read::<i64, D>(key) {
            return Ok(a.mapv(|v| v as f64));
        }
        self.read::<i32, D>(key)
            .map(|a| a.mapv(f64::from))
            .map_err(|e| malformed(key, "a numeric array", e))
    }

    /// Read a feature array of rank `D` as f32.
    pub fn floats32<D: Dimension>(&mut self, key: &str) -> DataResult<Array<f32, D>> {
        self.ensure_present(key)?;
        if let Ok(a) = self.read::<f32, D>(key) {
            return Ok(a);
        }
        self.read::<f64, D>(key)
            .map(|a| a.mapv(|v| v as f32))
            .map_err(|e| malformed(key, "a float array", e))
    }

    fn ensure_present(&self, key: &str) -> DataResult<()> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(DataError::MissingKey { mapping: self.label, key: key.to_string() })
        }
    }

    fn read<A, D>(&mut self, key: &str) -> Result<Array<A, D>, ReadNpzError>
    where
        A: ReadableElement,
        D: Dimension,
    {
        match self.reader.by_name(key) {
            Ok(a) => Ok(a),
            Err(_) => self.reader.by_name(&format!("{key}.npy")),
        }
    }
}

fn malformed(key: &str, expected: &str, e: ReadNpzError) -> DataError {
    DataError::MalformedStore {
        array:  key.to_string(),
        reason: format!("expected {expected} of the right rank ({e})"),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Ix1, Ix2};
    use ndarray_npy::NpzWriter;

    fn write_archive(path: &Path) {
        let mut npz = NpzWriter::new(File::create(path).unwrap());
        npz.add_array("as_i32", &array![[1i32, 2], [3, 4]]).unwrap();
        npz.add_array("as_u8", &array![7u8, 0, 9]).unwrap();
        npz.add_array("as_bool", &array![true, false]).unwrap();
        npz.add_array("as_f32", &array![0.5f32, 1.5]).unwrap();
        npz.finish().unwrap();
    }

    #[test]
    fn test_integer_widening() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.npz");
        write_archive(&path);

        let mut npz = NpzArchive::open(&path, "test store").unwrap();
        let m: Array<i64, Ix2> = npz.ints("as_i32").unwrap();
        assert_eq!(m, array![[1i64, 2], [3, 4]]);
        let v: Array<i64, Ix1> = npz.ints("as_u8").unwrap();
        assert_eq!(v.to_vec(), vec![7, 0, 9]);
        let b: Array<i64, Ix1> = npz.ints("as_bool").unwrap();
        assert_eq!(b.to_vec(), vec![1, 0]);
    }

    #[test]
    fn test_float_widening() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.npz");
        write_archive(&path);

        let mut npz = NpzArchive::open(&path, "test store").unwrap();
        let f: Array<f64, Ix1> = npz.floats("as_f32").unwrap();
        assert_eq!(f.to_vec(), vec![0.5, 1.5]);
        let m: Array<f64, Ix2> = npz.floats("as_i32").unwrap();
        assert_eq!(m[[1, 0]], 3.0);
    }

    #[test]
    fn test_missing_key() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.npz");
        write_archive(&path);

        let mut npz = NpzArchive::open(&path, "test store").unwrap();
        let err = npz.ints::<Ix1>("nope").unwrap_err();
        assert!(matches!(err, DataError::MissingKey { key, .. } if key == "nope"));
    }

    #[test]
    fn test_wrong_rank_is_malformed() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.npz");
        write_archive(&path);

        let mut npz = NpzArchive::open(&path, "test store").unwrap();
        let err = npz.ints::<Ix1>("as_i32").unwrap_err();
        assert!(matches!(err, DataError::MalformedStore { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = NpzArchive::open(Path::new("/definitely/not/here.npz"), "test store");
        assert!(matches!(err, Err(DataError::Open { .. })));
    }
}
