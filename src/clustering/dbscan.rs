// src/clustering/dbscan.rs

//! DBSCAN block pass: density-based extraction of representatives from a
//! bounded block of points.
//!
//! A representative is either the mean of a density-connected cluster or an
//! untouched noise point — this is what lets the hybrid clusterer compress
//! dense regions of near-duplicate pixels down to one mean per cluster
//! while still preserving rare colors that k-means averaging would erase.

use crate::clustering::{ClusterLabel, Clusterer};
use crate::color::ColorPoint;
use crate::rng::Xorshift64;
use crate::utils::log::debug;
use std::collections::{HashMap, VecDeque};

/// Minimum and maximum adaptive epsilon, in RGB working-space units.
pub const EPSILON_MIN: f64 = 8.0;
pub const EPSILON_MAX: f64 = 30.0;

/// Grid side is capped at this many cells per axis to bound memory.
const MAX_GRID_SIDE: f64 = 256.0;

/// Default `minPts` for the density criterion, matching the reference's
/// choice for RGB-space photographic input.
pub const DEFAULT_MIN_PTS: usize = 4;

const EPSILON_SAMPLE_BLOCKS: usize = 10;
const EPSILON_SAMPLE_POINTS_PER_BLOCK: usize = 20;
const EPSILON_MULTIPLIER: f64 = 1.5;

/// Estimates epsilon for a dataset by sampling up to
/// [`EPSILON_SAMPLE_BLOCKS`] contiguous blocks, drawing up to
/// [`EPSILON_SAMPLE_POINTS_PER_BLOCK`] points from each, computing each
/// sampled point's `(min_pts - 1)`-th nearest-neighbor distance, and taking
/// the median across every sample, multiplied by [`EPSILON_MULTIPLIER`] and
/// clamped to `[EPSILON_MIN, EPSILON_MAX]`.
///
/// This is computed once per hybrid-clusterer call and shared by every
/// block in that call (a single explicit policy, not a per-block estimate —
/// see the design notes' open-question resolution).
pub fn adaptive_epsilon(points: &[ColorPoint], min_pts: usize, rng: &mut Xorshift64) -> f64 {
    if points.len() <= min_pts {
        return EPSILON_MIN;
    }

    let block_count = EPSILON_SAMPLE_BLOCKS.min(points.len().max(1));
    let block_size = (points.len() / block_count).max(1);

    let mut kth_distances = Vec::new();
    for block_idx in 0..block_count {
        let start = block_idx * block_size;
        let end = if block_idx + 1 == block_count {
            points.len()
        } else {
            (start + block_size).min(points.len())
        };
        if end <= start {
            continue;
        }
        let block = &points[start..end];
        let draws = EPSILON_SAMPLE_POINTS_PER_BLOCK.min(block.len());
        for _ in 0..draws {
            let sample_idx = rng.uniform_usize(block.len());
            let sample = &block[sample_idx];
            if let Some(d) = kth_nearest_distance(sample, block, min_pts.saturating_sub(1)) {
                kth_distances.push(d);
            }
        }
    }

    if kth_distances.is_empty() {
        return EPSILON_MIN;
    }

    kth_distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = kth_distances[kth_distances.len() / 2];
    (median * EPSILON_MULTIPLIER).clamp(EPSILON_MIN, EPSILON_MAX)
}

fn kth_nearest_distance(point: &ColorPoint, block: &[ColorPoint], k: usize) -> Option<f64> {
    if block.len() <= 1 {
        return None;
    }
    let mut distances: Vec<f64> = block.iter().map(|p| p.distance_sq(point).sqrt()).collect();
    distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
    // distances[0] is the point itself (distance 0); the k-th neighbor
    // (1-indexed among *other* points) sits at distances[k].
    distances.get(k).copied()
}

/// A uniform 3-D grid over a point cloud's bounding box, used to accelerate
/// epsilon-range queries. Cell side equals `eps`, unless the bounding box is
/// large enough that this would exceed [`MAX_GRID_SIDE`] cells per axis, in
/// which case the cell side is enlarged to respect the cap.
struct SpatialGrid<'a> {
    points: &'a [ColorPoint],
    cell_side: f64,
    min: ColorPoint,
    cells: HashMap<(i64, i64, i64), Vec<usize>>,
}

impl<'a> SpatialGrid<'a> {
    fn build(points: &'a [ColorPoint], eps: f64) -> Self {
        let mut min = ColorPoint::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = ColorPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.c1 = min.c1.min(p.c1);
            min.c2 = min.c2.min(p.c2);
            min.c3 = min.c3.min(p.c3);
            max.c1 = max.c1.max(p.c1);
            max.c2 = max.c2.max(p.c2);
            max.c3 = max.c3.max(p.c3);
        }
        // Pad the bounding box by eps, as the reference spatial index does.
        min = ColorPoint::new(min.c1 - eps, min.c2 - eps, min.c3 - eps);
        max = ColorPoint::new(max.c1 + eps, max.c2 + eps, max.c3 + eps);

        let extent = (max.c1 - min.c1).max(max.c2 - min.c2).max(max.c3 - min.c3).max(eps);
        let cell_side = (extent / MAX_GRID_SIDE).max(eps);

        let mut grid = SpatialGrid {
            points,
            cell_side,
            min,
            cells: HashMap::new(),
        };
        for (i, p) in points.iter().enumerate() {
            let key = grid.cell_key(p);
            grid.cells.entry(key).or_default().push(i);
        }
        grid
    }

    fn cell_key(&self, p: &ColorPoint) -> (i64, i64, i64) {
        (
            ((p.c1 - self.min.c1) / self.cell_side).floor() as i64,
            ((p.c2 - self.min.c2) / self.cell_side).floor() as i64,
            ((p.c3 - self.min.c3) / self.cell_side).floor() as i64,
        )
    }

    /// Returns indices of every point within `eps` of `query` (squared
    /// distance compared against `eps * eps`), scanning the 27 cells
    /// neighboring the query cell.
    fn range_query(&self, query_idx: usize, eps: f64) -> Vec<usize> {
        let query = &self.points[query_idx];
        let (cx, cy, cz) = self.cell_key(query);
        let eps_sq = eps * eps;
        let mut result = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(indices) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        for &idx in indices {
                            if self.points[idx].distance_sq(query) <= eps_sq {
                                result.push(idx);
                            }
                        }
                    }
                }
            }
        }
        result
    }
}

/// Runs the DBSCAN pass over `points`, returning one label per point.
pub fn label_points(points: &[ColorPoint], eps: f64, min_pts: usize) -> Vec<ClusterLabel> {
    let n = points.len();
    let mut labels = vec![ClusterLabel::Unclassified; n];
    if n == 0 {
        return labels;
    }

    let grid = if n > 200 {
        Some(SpatialGrid::build(points, eps))
    } else {
        None
    };

    let neighbors_of = |idx: usize| -> Vec<usize> {
        match &grid {
            Some(g) => g.range_query(idx, eps),
            None => {
                let eps_sq = eps * eps;
                (0..n)
                    .filter(|&j| points[j].distance_sq(&points[idx]) <= eps_sq)
                    .collect()
            }
        }
    };

    let mut next_cluster_id: u32 = 0;

    for start in 0..n {
        if labels[start] != ClusterLabel::Unclassified {
            continue;
        }

        let seeds = neighbors_of(start);
        if seeds.len() < min_pts {
            labels[start] = ClusterLabel::Noise;
            continue;
        }

        let cluster_id = next_cluster_id;
        next_cluster_id += 1;
        labels[start] = ClusterLabel::Cluster(cluster_id);

        let mut queue: VecDeque<usize> = VecDeque::new();
        for &s in &seeds {
            if s == start {
                continue;
            }
            match labels[s] {
                ClusterLabel::Unclassified => {
                    labels[s] = ClusterLabel::InQueue;
                    queue.push_back(s);
                }
                ClusterLabel::Noise => {
                    labels[s] = ClusterLabel::Cluster(cluster_id);
                }
                _ => {}
            }
        }

        while let Some(q) = queue.pop_front() {
            labels[q] = ClusterLabel::Cluster(cluster_id);
            let q_neighbors = neighbors_of(q);
            if q_neighbors.len() >= min_pts {
                for &r in &q_neighbors {
                    match labels[r] {
                        ClusterLabel::Unclassified => {
                            labels[r] = ClusterLabel::InQueue;
                            queue.push_back(r);
                        }
                        ClusterLabel::Noise => {
                            labels[r] = ClusterLabel::Cluster(cluster_id);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    debug!(
        "dbscan block: {} points, eps={:.2}, min_pts={}, clusters={}",
        n, eps, min_pts, next_cluster_id
    );

    labels
}

/// Extracts representatives from a labeled block: one mean per cluster id
/// (in discovery order), followed by every noise point in input order.
pub fn representatives(points: &[ColorPoint], labels: &[ClusterLabel]) -> Vec<ColorPoint> {
    let mut cluster_count = 0usize;
    for label in labels {
        if let ClusterLabel::Cluster(id) = label {
            cluster_count = cluster_count.max(*id as usize + 1);
        }
    }

    let mut sums = vec![ColorPoint::zero(); cluster_count];
    let mut counts = vec![0usize; cluster_count];
    for (point, label) in points.iter().zip(labels.iter()) {
        if let ClusterLabel::Cluster(id) = label {
            let id = *id as usize;
            sums[id] = sums[id].add(point);
            counts[id] += 1;
        }
    }

    let mut result = Vec::with_capacity(cluster_count + points.len());
    for (sum, count) in sums.iter().zip(counts.iter()) {
        if *count > 0 {
            result.push(sum.scale(1.0 / *count as f64));
        }
    }
    for (point, label) in points.iter().zip(labels.iter()) {
        if *label == ClusterLabel::Noise {
            result.push(*point);
        }
    }
    result
}

/// Runs a full DBSCAN block pass (adaptive epsilon + labeling +
/// representative extraction) over a single block of points.
pub fn block_pass(points: &[ColorPoint], min_pts: usize, eps: f64) -> Vec<ColorPoint> {
    let labels = label_points(points, eps, min_pts);
    representatives(points, &labels)
}

/// The standalone DBSCAN strategy, exposed as a [`Clusterer`] implementation.
///
/// DBSCAN does not natively target a specific palette size, so `cluster`
/// treats the full input as a single block, estimates epsilon adaptively
/// from it, and then reconciles the representative count with `k` the same
/// way the hybrid clusterer reconciles block representatives: truncate to
/// the first `k` in discovery/input order if there are enough, otherwise
/// pad with uniformly random input points.
pub struct DbscanClusterer {
    pub min_pts: usize,
}

impl Default for DbscanClusterer {
    fn default() -> Self {
        DbscanClusterer {
            min_pts: DEFAULT_MIN_PTS,
        }
    }
}

impl Clusterer for DbscanClusterer {
    fn cluster(&self, points: &[ColorPoint], k: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
        if points.is_empty() || k == 0 {
            return Vec::new();
        }
        if k >= points.len() {
            return points.to_vec();
        }

        let eps = adaptive_epsilon(points, self.min_pts, rng);
        let mut reps = block_pass(points, self.min_pts, eps);

        if reps.len() > k {
            reps.truncate(k);
        } else {
            while reps.len() < k {
                reps.push(points[rng.uniform_usize(points.len())]);
            }
        }
        reps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_points_are_all_noise() {
        let points = vec![
            ColorPoint::new(0.0, 0.0, 0.0),
            ColorPoint::new(1000.0, 0.0, 0.0),
            ColorPoint::new(0.0, 1000.0, 0.0),
        ];
        let labels = label_points(&points, 10.0, 4);
        assert!(labels.iter().all(|l| *l == ClusterLabel::Noise));
    }

    #[test]
    fn dense_cluster_is_grouped() {
        let mut rng = Xorshift64::new(3);
        let mut points = Vec::new();
        for _ in 0..50 {
            points.push(ColorPoint::new(
                100.0 + rng.uniform_f64() * 2.0,
                100.0 + rng.uniform_f64() * 2.0,
                100.0 + rng.uniform_f64() * 2.0,
            ));
        }
        let labels = label_points(&points, 10.0, 4);
        assert!(labels.iter().all(|l| matches!(l, ClusterLabel::Cluster(0))));

        let reps = representatives(&points, &labels);
        assert_eq!(reps.len(), 1);
    }

    #[test]
    fn representatives_preserve_noise_points_and_means() {
        let points = vec![
            ColorPoint::new(0.0, 0.0, 0.0),
            ColorPoint::new(0.1, 0.0, 0.0),
            ColorPoint::new(0.2, 0.0, 0.0),
            ColorPoint::new(0.05, 0.1, 0.0),
            ColorPoint::new(500.0, 500.0, 500.0), // isolated -> noise
        ];
        let labels = label_points(&points, 5.0, 3);
        let reps = representatives(&points, &labels);
        // one cluster mean + one noise point
        assert_eq!(reps.len(), 2);
        assert!(reps.iter().any(|p| p.distance_sq(&ColorPoint::new(500.0, 500.0, 500.0)) < 1e-6));
    }

    #[test]
    fn adaptive_epsilon_stays_within_clamp_bounds() {
        let mut rng = Xorshift64::new(11);
        let points: Vec<ColorPoint> = (0..500)
            .map(|i| ColorPoint::new((i % 30) as f64, (i % 17) as f64, (i % 23) as f64))
            .collect();
        let eps = adaptive_epsilon(&points, DEFAULT_MIN_PTS, &mut rng);
        assert!(eps >= EPSILON_MIN && eps <= EPSILON_MAX);
    }

    #[test]
    fn grid_and_brute_force_range_queries_agree() {
        let mut rng = Xorshift64::new(21);
        let points: Vec<ColorPoint> = (0..400)
            .map(|_| ColorPoint::new(rng.uniform_f64() * 100.0, rng.uniform_f64() * 100.0, rng.uniform_f64() * 100.0))
            .collect();
        let eps = 12.0;
        let grid = SpatialGrid::build(&points, eps);

        for idx in (0..points.len()).step_by(37) {
            let mut via_grid = grid.range_query(idx, eps);
            let eps_sq = eps * eps;
            let mut via_brute: Vec<usize> = (0..points.len())
                .filter(|&j| points[j].distance_sq(&points[idx]) <= eps_sq)
                .collect();
            via_grid.sort();
            via_brute.sort();
            assert_eq!(via_grid, via_brute);
        }
    }
}
