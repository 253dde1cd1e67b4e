//! Marshalling between the caller's rows-of-vectors representation and the
//! internal row-major matrix, plus the standalone allocation entry point.
//!
//! These are thin layers by design: shape validation and element-wise copies
//! only, no algorithmic content.

use log::debug;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::engine::{active_centers, allocate_clusters};
use crate::error::{ConfigError, Result};

/// Keyed result of the standalone allocation entry point.
#[derive(Clone, Debug)]
pub struct AllocationOutcome {
    /// Nearest-center index for every data row.
    pub assignments: Vec<usize>,
    /// Indices of non-zero centers; populated only when trimming was
    /// requested.
    pub active_centers: Option<Vec<usize>>,
}

/// Ingress: copy the caller's rows into a row-major matrix.
///
/// # Errors
///
/// Rejects an empty row set and ragged rows before any copy is visible to the
/// numerical core.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>> {
    let n = rows.len();
    if n == 0 {
        return Err(ConfigError::EmptyData);
    }
    let d = rows[0].len();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != d {
            return Err(ConfigError::RaggedRows {
                row: i,
                expected: d,
                found: row.len(),
            });
        }
    }
    debug!("matrix_from_rows: {} rows × {} cols", n, d);
    let mut flat = Vec::with_capacity(n * d);
    for row in rows {
        flat.extend_from_slice(row);
    }
    Ok(DenseMatrix::new(n, d, flat, false).expect("rows validated rectangular"))
}

/// Egress: copy a matrix back into rows of vectors.
pub fn matrix_to_rows(m: &DenseMatrix<f64>) -> Vec<Vec<f64>> {
    let (n, d) = m.shape();
    (0..n)
        .map(|i| (0..d).map(|c| *m.get((i, c))).collect())
        .collect()
}

/// Convenience entry point: allocate `x` against a fixed center matrix and,
/// when trimming is requested, report which centers were active candidates.
pub fn allocate_points(
    x: &DenseMatrix<f64>,
    centers: &DenseMatrix<f64>,
    trimmed: bool,
) -> AllocationOutcome {
    let assignments = allocate_clusters(x, centers, trimmed);
    let active = if trimmed {
        Some(active_centers(centers))
    } else {
        None
    };
    AllocationOutcome {
        assignments,
        active_centers: active,
    }
}
