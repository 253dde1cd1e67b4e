//! Injectable random source for seeding, bootstrap resampling and
//! stability-pair sampling.
//!
//! Every component that draws randomness receives a `&mut RandomSource`
//! instead of reaching for a process-wide generator, so runs are reproducible
//! under an explicit seed and concurrent callers can each own a private
//! stream.

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seeded pseudo-random stream owned by one engine instance.
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Non-deterministic stream seeded from OS entropy.
    pub fn from_entropy() -> Self {
        debug!("RandomSource: seeding from entropy");
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Fully deterministic stream.
    pub fn seeded(seed: u64) -> Self {
        debug!("RandomSource: seeding with {}", seed);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Reseed from wall-clock time perturbed by an explicit offset, yielding
    /// reproducible-but-distinct streams for parallel invocations.
    pub fn reseed_with_offset(&mut self, offset: u64) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let seed = now.wrapping_add(offset);
        debug!("RandomSource: reseeding with offset {} -> {}", offset, seed);
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Uniform index in `[0, n)`.
    pub fn pick_index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    /// Two distinct uniform indices in `[0, n)`, redrawn until they differ.
    /// Requires `n >= 2`.
    pub fn distinct_pair(&mut self, n: usize) -> (usize, usize) {
        let i = self.rng.gen_range(0..n);
        loop {
            let j = self.rng.gen_range(0..n);
            if j != i {
                return (i, j);
            }
        }
    }

    /// Weighted index selection over strictly positive weights.
    ///
    /// Builds a prefix-sum array over the positive entries, draws a uniform
    /// value in `[0, total)` and binary-searches the first bucket whose
    /// cumulative sum covers the draw. Entries with zero or negative weight
    /// are excluded and can never be selected. Returns `None` when no weight
    /// is positive.
    pub fn weighted_pick(&mut self, weights: &[f64]) -> Option<usize> {
        let mut cumulative: Vec<f64> = Vec::with_capacity(weights.len());
        let mut indices: Vec<usize> = Vec::with_capacity(weights.len());
        let mut total = 0.0;
        for (i, &w) in weights.iter().enumerate() {
            if w > 0.0 {
                total += w;
                cumulative.push(total);
                indices.push(i);
            }
        }
        if cumulative.is_empty() {
            trace!("weighted_pick: no positive weights among {}", weights.len());
            return None;
        }
        let draw = self.rng.gen::<f64>() * total;
        let bucket = cumulative.partition_point(|&c| c < draw);
        // A draw of exactly `total` (possible through rounding) lands one past
        // the last bucket; clamp back onto it.
        let bucket = bucket.min(indices.len() - 1);
        trace!(
            "weighted_pick: draw={:.6} of total={:.6} -> index {}",
            draw,
            total,
            indices[bucket]
        );
        Some(indices[bucket])
    }

    /// Bootstrap resampling: draws `sample_size` row indices uniformly with
    /// replacement from `x` and returns them as a new `sample_size × d`
    /// matrix. The output row count never depends on the input row count.
    pub fn resample_rows(&mut self, x: &DenseMatrix<f64>, sample_size: usize) -> DenseMatrix<f64> {
        let (rows, cols) = x.shape();
        debug!(
            "resample_rows: {} draws with replacement from {} rows",
            sample_size, rows
        );
        let mut flat = Vec::with_capacity(sample_size * cols);
        for _ in 0..sample_size {
            let r = self.rng.gen_range(0..rows);
            for c in 0..cols {
                flat.push(*x.get((r, c)));
            }
        }
        DenseMatrix::new(sample_size, cols, flat, false)
            .expect("resampled dimensions are consistent by construction")
    }
}
