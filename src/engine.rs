//! Regularized Lloyd's-style clustering engine.
//!
//! The engine iterates nearest-center allocation against a regularized,
//! non-negativity-constrained center update until the assignment vector
//! reaches a fixed point or an iteration cap. The regularization strength is
//! annealed linearly over the first `anneal_iters` iterations so centers are
//! not shrunk to zero before a coarse partition has stabilized. In trimmed
//! mode, centers that collapse to the zero vector stop receiving points.

use log::{debug, info, trace, warn};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{ConfigError, Result};
use crate::sampling::RandomSource;

/// Hard cap on allocate/update iterations.
pub const DEFAULT_ITERATION_CAP: usize = 1000;

/// Iteration at which the annealed regularization reaches full strength.
pub const DEFAULT_ANNEAL_ITERS: usize = 20;

/// Fixed-point output of one `fit` call.
#[derive(Clone, Debug)]
pub struct ClusteringResult {
    /// Center index in `[0, k)` for every data row.
    pub assignments: Vec<usize>,
    /// `k × d` center matrix, element-wise non-negative.
    pub centers: DenseMatrix<f64>,
    /// Within-cluster sum of squares plus `reg` times total center mass.
    pub objective: f64,
    /// Allocate/update iterations actually run.
    pub iterations: usize,
    /// Whether the assignment vector reached a fixed point before the cap.
    pub converged: bool,
}

/// Indices of center rows that are not exactly the zero vector.
pub fn active_centers(centers: &DenseMatrix<f64>) -> Vec<usize> {
    let (k, d) = centers.shape();
    (0..k)
        .filter(|&i| (0..d).any(|c| *centers.get((i, c)) != 0.0))
        .collect()
}

fn sq_dist_to_center(x: &DenseMatrix<f64>, row: usize, centers: &DenseMatrix<f64>, center: usize) -> f64 {
    let d = x.shape().1;
    let mut acc = 0.0;
    for c in 0..d {
        let diff = *x.get((row, c)) - *centers.get((center, c));
        acc += diff * diff;
    }
    acc
}

fn sq_dist_to_point(x: &DenseMatrix<f64>, row: usize, p: &[f64]) -> f64 {
    let mut acc = 0.0;
    for (c, v) in p.iter().enumerate() {
        let diff = *x.get((row, c)) - *v;
        acc += diff * diff;
    }
    acc
}

/// Assign every row of `x` to its nearest candidate center.
///
/// The candidate set is every center row, or only the non-zero rows when
/// `trimmed` is true. With fewer than 2 candidates every point is assigned to
/// index 0 — the degenerate single-cluster case, not an error. Ties resolve
/// to the lowest-indexed candidate. Stateless: the full vector is recomputed
/// on every call because centers may move arbitrarily between calls.
pub fn allocate_clusters(
    x: &DenseMatrix<f64>,
    centers: &DenseMatrix<f64>,
    trimmed: bool,
) -> Vec<usize> {
    let n = x.shape().0;
    let k = centers.shape().0;

    let candidates: Vec<usize> = if trimmed {
        active_centers(centers)
    } else {
        (0..k).collect()
    };

    if candidates.len() < 2 {
        debug!(
            "allocate_clusters: {} candidate centers, trivial single-cluster assignment",
            candidates.len()
        );
        return vec![0; n];
    }

    let mut assignments = vec![0usize; n];
    for i in 0..n {
        let mut best = candidates[0];
        let mut best_dist = sq_dist_to_center(x, i, centers, candidates[0]);
        for &j in &candidates[1..] {
            let dist = sq_dist_to_center(x, i, centers, j);
            if dist < best_dist {
                best_dist = dist;
                best = j;
            }
        }
        assignments[i] = best;
    }
    assignments
}

/// Recompute all `k` centers from the current assignments under an L1-style
/// penalty with a non-negativity constraint.
///
/// Per label the unconstrained mean `m` is soft-thresholded element-wise to
/// `min(m + reg/2, max(m - reg/2, 0))`: coordinates whose mean lies within
/// `reg/2` of zero collapse to exactly zero, and `reg = 0` reduces to the
/// arithmetic mean clamped at zero. A label with no members collapses its
/// center to the zero vector, which keeps every value finite and hands the
/// center to the trimmed-allocation filter instead of propagating NaN.
pub fn reevaluate_centers(
    x: &DenseMatrix<f64>,
    assignments: &[usize],
    k: usize,
    reg: f64,
) -> DenseMatrix<f64> {
    let (n, d) = x.shape();
    let mut sums = vec![0.0; k * d];
    let mut counts = vec![0usize; k];

    for i in 0..n {
        let label = assignments[i];
        counts[label] += 1;
        for c in 0..d {
            sums[label * d + c] += *x.get((i, c));
        }
    }

    let mut flat = vec![0.0; k * d];
    for label in 0..k {
        if counts[label] == 0 {
            trace!("reevaluate_centers: label {} empty, center collapses to zero", label);
            continue;
        }
        let count = counts[label] as f64;
        for c in 0..d {
            let m = sums[label * d + c] / count;
            flat[label * d + c] = (m + reg / 2.0).min((m - reg / 2.0).max(0.0));
        }
    }

    DenseMatrix::new(k, d, flat, false).expect("center dimensions are consistent by construction")
}

/// Penalized clustering objective: within-cluster sum of squared Euclidean
/// distances plus `reg` times the sum of all center coordinates.
pub fn cluster_objective(
    x: &DenseMatrix<f64>,
    centers: &DenseMatrix<f64>,
    assignments: &[usize],
    reg: f64,
) -> f64 {
    let n = x.shape().0;
    let (k, d) = centers.shape();
    let mut ssq = 0.0;
    for i in 0..n {
        ssq += sq_dist_to_center(x, i, centers, assignments[i]);
    }
    for j in 0..k {
        for c in 0..d {
            ssq += *centers.get((j, c)) * reg;
        }
    }
    ssq
}

/// Regularized clustering engine with builder-style configuration.
///
/// The engine carries tunables only; all randomness flows through the
/// [`RandomSource`] passed into [`fit`](ClusterEngine::fit), so callers
/// control determinism and thread isolation.
#[derive(Clone, Debug)]
pub struct ClusterEngine {
    iteration_cap: usize,
    anneal_iters: usize,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self {
            iteration_cap: DEFAULT_ITERATION_CAP,
            anneal_iters: DEFAULT_ANNEAL_ITERS,
        }
    }
}

impl ClusterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the hard iteration cap (default 1000).
    pub fn with_iteration_cap(mut self, cap: usize) -> Self {
        self.iteration_cap = cap;
        self
    }

    /// Override the iteration at which annealed regularization reaches full
    /// strength (default 20). Zero disables annealing entirely.
    pub fn with_anneal_iters(mut self, iters: usize) -> Self {
        self.anneal_iters = iters;
        self
    }

    /// Distance-weighted seeding: the first center is a uniformly random data
    /// row, each subsequent center is drawn with probability proportional to
    /// the squared distance to the nearest center chosen so far. When every
    /// remaining row coincides with a chosen center (all weights zero) the
    /// draw falls back to uniform.
    fn seed_centers(
        &self,
        x: &DenseMatrix<f64>,
        k: usize,
        rng: &mut RandomSource,
    ) -> DenseMatrix<f64> {
        let (n, d) = x.shape();
        let mut flat: Vec<f64> = Vec::with_capacity(k * d);

        let first = rng.pick_index(n);
        trace!("seed_centers: first center from row {}", first);
        flat.extend((0..d).map(|c| *x.get((first, c))));

        let mut dists: Vec<f64> = (0..n).map(|i| sq_dist_to_point(x, i, &flat[0..d])).collect();

        for _ in 1..k {
            let next = match rng.weighted_pick(&dists) {
                Some(idx) => idx,
                None => {
                    warn!("seed_centers: all seeding weights zero, falling back to uniform draw");
                    rng.pick_index(n)
                }
            };
            let row: Vec<f64> = (0..d).map(|c| *x.get((next, c))).collect();
            for i in 0..n {
                let dist = sq_dist_to_point(x, i, &row);
                if dist < dists[i] {
                    dists[i] = dist;
                }
            }
            flat.extend(row);
        }

        DenseMatrix::new(k, d, flat, false).expect("seeded dimensions are consistent by construction")
    }

    /// Run the full seeding → iterate → score pipeline on `x`.
    ///
    /// # Errors
    ///
    /// Fails fast on invalid configuration (`x` empty, `k` outside
    /// `1..=rows`, negative `reg`) before any computation; every numerical
    /// step afterwards recovers locally and never errors.
    pub fn fit(
        &self,
        x: &DenseMatrix<f64>,
        k: usize,
        reg: f64,
        trimmed: bool,
        rng: &mut RandomSource,
    ) -> Result<ClusteringResult> {
        let (n, d) = x.shape();
        if n == 0 {
            return Err(ConfigError::EmptyData);
        }
        if k < 1 || k > n {
            return Err(ConfigError::InvalidK { k, rows: n });
        }
        if reg < 0.0 {
            return Err(ConfigError::NegativeReg(reg));
        }

        info!(
            "fit: {} rows × {} cols, k={}, reg={}, trimmed={}",
            n, d, k, reg, trimmed
        );

        let mut centers = self.seed_centers(x, k, rng);
        let mut assignments: Vec<usize> = vec![usize::MAX; n];
        let mut previous: Vec<usize> = vec![usize::MAX; n];
        let mut converged = false;
        let mut iterations = 0;

        for i in 0..self.iteration_cap {
            iterations = i + 1;
            assignments = allocate_clusters(x, &centers, trimmed);
            if i > self.anneal_iters && assignments == previous {
                converged = true;
                break;
            }
            previous.clone_from(&assignments);

            let reg_i = if self.anneal_iters == 0 {
                reg
            } else {
                reg.min(reg * i as f64 / self.anneal_iters as f64)
            };
            trace!("fit: iteration {}, annealed reg {:.6}", i, reg_i);
            centers = reevaluate_centers(x, &assignments, k, reg_i);
        }

        if iterations == 0 {
            // A zero iteration cap still yields a valid allocation against
            // the seeded centers.
            assignments = allocate_clusters(x, &centers, trimmed);
        }
        if !converged {
            debug!("fit: iteration cap {} reached without a fixed point", self.iteration_cap);
        }

        let objective = cluster_objective(x, &centers, &assignments, reg);
        let active = active_centers(&centers).len();
        info!(
            "fit complete: {} iterations, converged={}, objective={:.6}, {}/{} active centers",
            iterations, converged, objective, active, k
        );

        Ok(ClusteringResult {
            assignments,
            centers,
            objective,
            iterations,
            converged,
        })
    }
}
