// ============================================================
// Layer 6 — Hidden State Store
// ============================================================
// Reads encoder hidden states from a NumPy .npy file.
//
//   [H]     → one state, returned as [1, H]
//   [N, H]  → one state per record, row r for record r
//
// f64 files are narrowed to f32.

use anyhow::{bail, Context, Result};
use ndarray::{Array2, ArrayD, Axis, Ix2};
use ndarray_npy::ReadNpyExt;
use std::{fs::File, io::BufReader, path::Path};

pub fn load_hidden_states(path: &Path) -> Result<Array2<f32>> {
    let open = || -> Result<BufReader<File>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open hidden states: {:?}", path))?;
        Ok(BufReader::new(file))
    };

    let arr = match ArrayD::<f32>::read_npy(open()?) {
        Ok(a) => a,
        Err(_) => ArrayD::<f64>::read_npy(open()?)
            .with_context(|| format!("Failed to parse NumPy file: {:?}", path))?
            .mapv(|v| v as f32),
    };

    let states = match arr.ndim() {
        1 => arr.insert_axis(Axis(0)).into_dimensionality::<Ix2>()?,
        2 => arr.into_dimensionality::<Ix2>()?,
        n => bail!("Hidden states in {:?} have rank {n}, expected 1 or 2", path),
    };
    tracing::debug!("Loaded hidden states {:?} from {:?}", states.dim(), path);
    Ok(states)
}
