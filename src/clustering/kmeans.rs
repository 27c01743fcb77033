// src/clustering/kmeans.rs

//! K-means++ seeding and Lloyd iteration.
//!
//! Mean accumulation always happens in `f64` (every [`ColorPoint`] component
//! already is one), so order-dependent rounding from mixed precision never
//! enters the picture regardless of how the outer assignment loop is
//! parallelized.

use crate::clustering::nearest::assign_all;
use crate::clustering::Clusterer;
use crate::color::ColorPoint;
use crate::rng::Xorshift64;
use crate::utils::log::debug;

/// Centroid movement below this threshold (in working-space units) is
/// considered converged, matching the reference implementation's `tau`.
pub const CONVERGENCE_TAU: f64 = 1.0;

/// Above this `k`, k-means++'s O(kN) seeding cost dominates for marginal
/// quality gain, so seeding falls back to stratified sampling.
const KMEANS_PLUS_PLUS_MAX_K: usize = 64;

fn iteration_cap(k: usize) -> usize {
    if k > 100 {
        20
    } else if k > 32 {
        30
    } else {
        50
    }
}

/// Runs k-means on `points`, producing exactly `k` centroids when `points`
/// has at least `k` distinct-or-not points. Edge cases: `points` empty or
/// `k == 0` returns an empty vector; `k >= points.len()` returns the input
/// points themselves (in input order, truncated/copied to length `k`).
pub fn run_kmeans(points: &[ColorPoint], k: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
    if points.is_empty() || k == 0 {
        return Vec::new();
    }
    if k >= points.len() {
        return points.to_vec();
    }

    let mut centroids = seed_centroids(points, k, rng);
    let mut assignments: Vec<usize> = Vec::new();
    let cap = iteration_cap(k);

    for iteration in 0..cap {
        let changed = assign_all(points, &centroids, &mut assignments);

        let mut sums = vec![ColorPoint::zero(); k];
        let mut counts = vec![0usize; k];
        for (point, &cluster) in points.iter().zip(assignments.iter()) {
            sums[cluster] = sums[cluster].add(point);
            counts[cluster] += 1;
        }

        let mut max_movement = 0.0f64;
        for c in 0..k {
            let new_centroid = if counts[c] == 0 {
                // Empty-cluster reseed: pick a uniformly random input point.
                points[rng.uniform_usize(points.len())]
            } else {
                sums[c].scale(1.0 / counts[c] as f64)
            };
            let movement = new_centroid.distance_sq(&centroids[c]).sqrt();
            max_movement = max_movement.max(movement);
            centroids[c] = new_centroid;
        }

        debug!(
            "kmeans iteration {iteration}: changed={changed} max_movement={max_movement:.4}"
        );

        if changed == 0 || max_movement < CONVERGENCE_TAU {
            break;
        }
    }

    centroids
}

fn seed_centroids(points: &[ColorPoint], k: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
    if k <= KMEANS_PLUS_PLUS_MAX_K {
        seed_kmeans_plus_plus(points, k, rng)
    } else {
        seed_stratified(points, k, rng)
    }
}

fn seed_kmeans_plus_plus(points: &[ColorPoint], k: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
    let mut centroids = Vec::with_capacity(k);
    let first = points[rng.uniform_usize(points.len())];
    centroids.push(first);

    let mut nearest_dist_sq: Vec<f64> = points.iter().map(|p| p.distance_sq(&first)).collect();

    while centroids.len() < k {
        let total: f64 = nearest_dist_sq.iter().sum();
        let chosen_index = if total <= 0.0 {
            // All remaining points coincide with an existing centroid;
            // fall back to a uniform draw to keep progress deterministic.
            rng.uniform_usize(points.len())
        } else {
            let target = rng.uniform_f64() * total;
            let mut cumulative = 0.0;
            let mut chosen = points.len() - 1;
            for (i, &d) in nearest_dist_sq.iter().enumerate() {
                cumulative += d;
                if cumulative >= target {
                    chosen = i;
                    break;
                }
            }
            chosen
        };

        let next = points[chosen_index];
        centroids.push(next);

        for (i, p) in points.iter().enumerate() {
            let d = p.distance_sq(&next);
            if d < nearest_dist_sq[i] {
                nearest_dist_sq[i] = d;
            }
        }
    }

    centroids
}

fn seed_stratified(points: &[ColorPoint], k: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
    let n = points.len();
    let step = n / k;
    (0..k)
        .map(|c| {
            let offset = if step > 0 { rng.uniform_usize(step) } else { 0 };
            let idx = (c * step + offset) % n;
            points[idx]
        })
        .collect()
}

/// The plain k-means strategy, exposed as a [`Clusterer`] implementation.
pub struct KMeansClusterer;

impl Clusterer for KMeansClusterer {
    fn cluster(&self, points: &[ColorPoint], k: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
        run_kmeans(points, k, rng)
    }
}
