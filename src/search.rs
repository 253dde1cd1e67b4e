//! Bootstrap grid search over `(k, reg)` hyperparameter pairs.
//!
//! Each trial draws two independent bootstrap samples, clusters each with
//! trimming enabled, re-allocates the original data against both trial
//! center sets and scores the agreement of the resulting labelings. Averaged
//! over trials this yields, per grid cell, an expected stability and an
//! expected effective cluster count — the basis for picking the smallest
//! `reg` and most appropriate `k` that still give stable, well-populated
//! clusters.

use log::{debug, info};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::engine::{allocate_clusters, ClusterEngine};
use crate::error::{ConfigError, Result};
use crate::sampling::RandomSource;
use crate::stability::{n_used_clusters, stability_score};

/// Axes and trial counts for one hyperparameter sweep.
#[derive(Clone, Debug)]
pub struct SearchParams {
    /// Candidate cluster counts (grid rows).
    pub k_grid: Vec<usize>,
    /// Candidate regularization strengths (grid columns).
    pub reg_grid: Vec<f64>,
    /// Bootstrap trial repetitions per grid cell.
    pub iterations: usize,
    /// Rows drawn (with replacement) per bootstrap sample.
    pub bootstrap_size: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            k_grid: (2..=10).collect(),
            reg_grid: vec![0.0, 0.5, 1.0],
            iterations: 5,
            bootstrap_size: 500,
        }
    }
}

/// Aggregated sweep output: one `|k_grid| × |reg_grid|` matrix per metric.
#[derive(Clone, Debug)]
pub struct SearchGrid {
    pub k_grid: Vec<usize>,
    pub reg_grid: Vec<f64>,
    /// Average stability score per cell.
    pub stability: DenseMatrix<f64>,
    /// Average number of non-empty clusters per trial per cell.
    pub used_clusters: DenseMatrix<f64>,
}

/// Bootstrap hyperparameter sweep driver.
///
/// Owns the random stream shared by bootstrap sampling, engine seeding and
/// stability-pair sampling, so a single seed makes the whole sweep
/// reproducible.
pub struct HyperparameterSearch {
    params: SearchParams,
    engine: ClusterEngine,
    rng: RandomSource,
}

impl HyperparameterSearch {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            engine: ClusterEngine::new(),
            rng: RandomSource::from_entropy(),
        }
    }

    /// Seed the shared random stream deterministically.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RandomSource::seeded(seed);
        self
    }

    /// Perturb a wall-clock seed with an explicit offset for
    /// reproducible-but-distinct parallel sweeps.
    pub fn with_seed_offset(mut self, offset: u64) -> Self {
        self.rng.reseed_with_offset(offset);
        self
    }

    /// Forwarded to the inner engine, see [`ClusterEngine::with_anneal_iters`].
    pub fn with_anneal_iters(mut self, iters: usize) -> Self {
        self.engine = self.engine.with_anneal_iters(iters);
        self
    }

    /// Forwarded to the inner engine, see [`ClusterEngine::with_iteration_cap`].
    pub fn with_iteration_cap(mut self, cap: usize) -> Self {
        self.engine = self.engine.with_iteration_cap(cap);
        self
    }

    fn validate(&self, x: &DenseMatrix<f64>) -> Result<()> {
        if x.shape().0 == 0 {
            return Err(ConfigError::EmptyData);
        }
        if self.params.k_grid.is_empty() {
            return Err(ConfigError::EmptyGrid("k_grid"));
        }
        if self.params.reg_grid.is_empty() {
            return Err(ConfigError::EmptyGrid("reg_grid"));
        }
        if self.params.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.params.bootstrap_size == 0 {
            return Err(ConfigError::ZeroBootstrap);
        }
        for &k in &self.params.k_grid {
            // Every trial clusters a bootstrap sample of `bootstrap_size`
            // rows, so k must be seedable from that sample.
            if k < 1 || k > self.params.bootstrap_size {
                return Err(ConfigError::InvalidK {
                    k,
                    rows: self.params.bootstrap_size,
                });
            }
        }
        for &reg in &self.params.reg_grid {
            if reg < 0.0 {
                return Err(ConfigError::NegativeReg(reg));
            }
        }
        Ok(())
    }

    /// Sweep the full grid over `x` and average the per-cell accumulators.
    pub fn run(&mut self, x: &DenseMatrix<f64>) -> Result<SearchGrid> {
        self.validate(x)?;

        let k_size = self.params.k_grid.len();
        let reg_size = self.params.reg_grid.len();
        info!(
            "search: {}×{} grid, {} iterations, bootstrap size {}",
            k_size, reg_size, self.params.iterations, self.params.bootstrap_size
        );

        let mut stability_acc = vec![0.0; k_size * reg_size];
        let mut used_acc = vec![0.0; k_size * reg_size];

        for iteration in 0..self.params.iterations {
            debug!("search: iteration {}/{}", iteration + 1, self.params.iterations);
            for (j, &k) in self.params.k_grid.iter().enumerate() {
                for (l, &reg) in self.params.reg_grid.iter().enumerate() {
                    let cell = j * reg_size + l;

                    let b1 = self.rng.resample_rows(x, self.params.bootstrap_size);
                    let b2 = self.rng.resample_rows(x, self.params.bootstrap_size);

                    let ret1 = self.engine.fit(&b1, k, reg, true, &mut self.rng)?;
                    let ret2 = self.engine.fit(&b2, k, reg, true, &mut self.rng)?;

                    // Both trial partitions are carried back onto the full
                    // data so the two labelings share one index space.
                    let ind1 = allocate_clusters(x, &ret1.centers, false);
                    let ind2 = allocate_clusters(x, &ret2.centers, false);

                    let score = stability_score(&ind1, &ind2, k, &mut self.rng);
                    stability_acc[cell] += score;
                    used_acc[cell] += n_used_clusters(k, &ret1.assignments) as f64;
                    used_acc[cell] += n_used_clusters(k, &ret2.assignments) as f64;

                    debug!(
                        "search: cell (k={}, reg={}) stability {:.4}, used {}/{} + {}/{}",
                        k,
                        reg,
                        score,
                        n_used_clusters(k, &ret1.assignments),
                        k,
                        n_used_clusters(k, &ret2.assignments),
                        k
                    );
                }
            }
        }

        let iters = self.params.iterations as f64;
        for cell in 0..k_size * reg_size {
            stability_acc[cell] /= iters;
            // Two trials contribute a cluster count per iteration.
            used_acc[cell] /= 2.0 * iters;
        }

        info!("search complete: {} cells averaged over {} iterations", k_size * reg_size, self.params.iterations);
        Ok(SearchGrid {
            k_grid: self.params.k_grid.clone(),
            reg_grid: self.params.reg_grid.clone(),
            stability: DenseMatrix::new(k_size, reg_size, stability_acc, false)
                .expect("grid dimensions are consistent by construction"),
            used_clusters: DenseMatrix::new(k_size, reg_size, used_acc, false)
                .expect("grid dimensions are consistent by construction"),
        })
    }
}
