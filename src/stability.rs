//! Chance-corrected agreement between two clusterings of the same data.
//!
//! The raw statistic is a Monte-Carlo estimate of the probability that two
//! labelings agree on whether a random pair of distinct observations is
//! co-clustered. The estimate is then corrected for chance with expected
//! co-clustering rates derived analytically from each labeling's cluster-size
//! distribution, giving an adjusted-Rand-style score: chance-level agreement
//! maps to 0 and perfect agreement to 1 (theoretical range `[-1, 1]`).

use log::{debug, warn};

use crate::sampling::RandomSource;

/// Number of random index pairs drawn per comparison.
pub const STABILITY_PAIRS: usize = 10_000;

/// Adjusted pairwise-agreement score over [`STABILITY_PAIRS`] random pairs.
///
/// `k` must cover the label space of both `labels1` and `labels2`. When a
/// labeling puts every observation in one cluster the chance-agreement rate
/// reaches 1 and the correction is undefined (NaN); callers comparing
/// degenerate clusterings should check for that case.
pub fn stability_score(
    labels1: &[usize],
    labels2: &[usize],
    k: usize,
    rng: &mut RandomSource,
) -> f64 {
    stability_score_with_pairs(labels1, labels2, k, STABILITY_PAIRS, rng)
}

/// [`stability_score`] with an explicit pair budget.
pub fn stability_score_with_pairs(
    labels1: &[usize],
    labels2: &[usize],
    k: usize,
    pairs: usize,
    rng: &mut RandomSource,
) -> f64 {
    debug_assert_eq!(labels1.len(), labels2.len(), "labelings must cover the same rows");
    let n = labels1.len();
    if n < 2 {
        warn!("stability_score: fewer than 2 observations, agreement is trivially perfect");
        return 1.0;
    }
    let size = n as f64;

    // Cluster population fractions per labeling.
    let mut population1 = vec![0.0; k];
    let mut population2 = vec![0.0; k];
    for i in 0..n {
        population1[labels1[i]] += 1.0 / size;
        population2[labels2[i]] += 1.0 / size;
    }

    // Expected rates of agreeing by chance: both co-clustered, or both
    // separated, under independent labelings with these populations. The
    // `(p - 1/n) * n/(n-1)` factor is the without-replacement correction for
    // drawing the second index of a pair.
    let correction = size / (size - 1.0);
    let co1: f64 = population1.iter().map(|p| p * (p - 1.0 / size) * correction).sum();
    let co2: f64 = population2.iter().map(|p| p * (p - 1.0 / size) * correction).sum();
    let sep1: f64 = population1
        .iter()
        .map(|p| p * (1.0 - (p - 1.0 / size) * correction))
        .sum();
    let sep2: f64 = population2
        .iter()
        .map(|p| p * (1.0 - (p - 1.0 / size) * correction))
        .sum();
    let chance = co1 * co2 + sep1 * sep2;

    let mut agreements = 0usize;
    for _ in 0..pairs {
        let (i, j) = rng.distinct_pair(n);
        let together1 = labels1[i] == labels1[j];
        let together2 = labels2[i] == labels2[j];
        if together1 == together2 {
            agreements += 1;
        }
    }
    let rate = agreements as f64 / pairs as f64;
    let score = (rate - chance) / (1.0 - chance);
    debug!(
        "stability_score: rate={:.4}, chance={:.4}, adjusted={:.4}",
        rate, chance, score
    );
    score
}

/// Number of labels in `[0, k)` with at least one member.
pub fn n_used_clusters(k: usize, assignments: &[usize]) -> usize {
    let mut used = vec![false; k];
    for &label in assignments {
        used[label] = true;
    }
    used.iter().filter(|&&u| u).count()
}
