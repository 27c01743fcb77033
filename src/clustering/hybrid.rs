// src/clustering/hybrid.rs

//! The hybrid clusterer: DBSCAN-compress each block of a large point cloud
//! down to representatives, then run k-means over the pooled
//! representatives to reach the requested palette size.
//!
//! This is what lets the engine handle a quarter-million sampled pixels in
//! roughly the time plain k-means would take on a few thousand: DBSCAN's
//! per-block pass is the expensive O(block²)-ish step, but each block is
//! small and independent, so it parallelizes trivially and collapses
//! millions of near-duplicate pixels into a handful of means before k-means
//! ever sees them.

use crate::clustering::dbscan::{adaptive_epsilon, block_pass, DEFAULT_MIN_PTS};
use crate::clustering::kmeans::run_kmeans;
use crate::clustering::Clusterer;
use crate::color::ColorPoint;
use crate::rng::Xorshift64;
use crate::utils::log::debug;

/// Direct k-means is used instead of the block pass when the input is no
/// more than twice the block size.
const DIRECT_KMEANS_MULTIPLE: usize = 2;

/// Default block size for the DBSCAN pass.
pub const DEFAULT_BLOCK_SIZE: usize = 1_000;

/// Runs the hybrid pipeline: below `2 * block_size` points, this degrades to
/// plain k-means; above it, the input is partitioned into
/// `ceil(n / block_size)` contiguous blocks, each DBSCAN-compressed
/// independently (in original block order, so the result is independent of
/// how blocks happen to be scheduled), and k-means runs over the pooled
/// representatives. If pooled representatives fall short of `k`, the pool
/// is padded with uniformly random input points before the final k-means
/// pass, matching the plain clusterers' empty-cluster reseed behavior.
pub fn run_hybrid(points: &[ColorPoint], k: usize, block_size: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
    if points.is_empty() || k == 0 {
        return Vec::new();
    }
    if k >= points.len() {
        return points.to_vec();
    }
    if points.len() <= block_size * DIRECT_KMEANS_MULTIPLE {
        return run_kmeans(points, k, rng);
    }

    let min_pts = DEFAULT_MIN_PTS;
    let eps = adaptive_epsilon(points, min_pts, rng);

    let block_count = points.len().div_ceil(block_size);
    let mut representatives = Vec::new();
    for block_idx in 0..block_count {
        let start = block_idx * block_size;
        let end = ((block_idx + 1) * block_size).min(points.len());
        let block = &points[start..end];
        representatives.extend(block_pass(block, min_pts, eps));
    }

    debug!(
        "hybrid: {} points, {} blocks, eps={:.2} -> {} representatives",
        points.len(),
        block_count,
        eps,
        representatives.len()
    );

    if representatives.len() < k {
        while representatives.len() < k {
            representatives.push(points[rng.uniform_usize(points.len())]);
        }
    }

    run_kmeans(&representatives, k, rng)
}

/// The hybrid strategy, exposed as a [`Clusterer`] implementation, using
/// [`DEFAULT_BLOCK_SIZE`].
pub struct HybridClusterer {
    pub block_size: usize,
}

impl Default for HybridClusterer {
    fn default() -> Self {
        HybridClusterer {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl Clusterer for HybridClusterer {
    fn cluster(&self, points: &[ColorPoint], k: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
        run_hybrid(points, k, self.block_size, rng)
    }
}
