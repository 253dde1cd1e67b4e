//! Regularized k-means clustering with bootstrap-based hyperparameter
//! selection.
//!
//! The crate implements a "sparse/trimmed" variant of Lloyd's algorithm: the
//! center update is a proximal soft-threshold enforcing non-negativity, so a
//! sufficiently strong regularization collapses whole centers to the zero
//! vector, and trimmed allocation then excludes them from receiving points.
//! An outer bootstrap loop sweeps a `(k, reg)` grid and scores each cell with
//! a chance-corrected pairwise-agreement statistic between two independent
//! clusterings, guiding the choice of a stable, well-populated cluster count.
//!
//! # Overview
//!
//! - **[`ClusterEngine`]**: seeding, annealed allocate/update iteration,
//!   convergence detection and the penalized objective.
//! - **[`stability_score`]**: Monte-Carlo adjusted agreement between two
//!   labelings of the same rows.
//! - **[`HyperparameterSearch`]**: bootstrap trials over the `(k, reg)` grid,
//!   aggregating stability and cluster utilization.
//! - **[`RandomSource`]**: injectable seeded RNG shared by seeding, bootstrap
//!   and stability sampling; without an explicit seed, results vary run to
//!   run.
//! - **[`allocate_points`] / [`matrix_from_rows`]**: thin marshalling for
//!   callers holding rows of vectors.
//!
//! # Usage
//!
//! ```ignore
//! use regclust::{matrix_from_rows, ClusterEngine, RandomSource};
//!
//! let x = matrix_from_rows(&rows)?;
//! let mut rng = RandomSource::seeded(42);
//! let result = ClusterEngine::new().fit(&x, 3, 0.5, true, &mut rng)?;
//! println!("objective {:.4}", result.objective);
//! ```
//!
//! Everything runs single-threaded and synchronously; the only built-in
//! bounds are the engine's iteration cap and the fixed stability pair budget.

pub mod convert;
pub mod engine;
pub mod error;
pub mod sampling;
pub mod search;
pub mod stability;

#[cfg(test)]
mod tests;

pub use convert::{allocate_points, matrix_from_rows, matrix_to_rows, AllocationOutcome};
pub use engine::{
    active_centers, allocate_clusters, cluster_objective, reevaluate_centers, ClusterEngine,
    ClusteringResult, DEFAULT_ANNEAL_ITERS, DEFAULT_ITERATION_CAP,
};
pub use error::{ConfigError, Result};
pub use sampling::RandomSource;
pub use search::{HyperparameterSearch, SearchGrid, SearchParams};
pub use stability::{n_used_clusters, stability_score, stability_score_with_pairs, STABILITY_PAIRS};

/// Install a test-friendly logger; safe to call from every test.
#[cfg(test)]
pub(crate) fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
