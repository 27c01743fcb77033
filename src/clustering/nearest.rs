// src/clustering/nearest.rs

//! Nearest-centroid search: the innermost hot loop of both k-means and
//! resynthesis.
//!
//! Ties are always broken toward the lowest index — this is a testable
//! invariant, not an implementation accident. A four-wide unrolled variant
//! is used when `centroids.len() >= 4` and the `portable_simd` feature is
//! enabled; otherwise a plain scalar scan runs. Both paths must agree
//! bit-for-bit, since only the inner loop's instruction count changes, not
//! its arithmetic.

#![cfg_attr(feature = "portable_simd", allow(unused))]

use crate::color::ColorPoint;

/// Above this many points, the outer per-point loop may be parallelized.
/// The inner per-point nearest-centroid scan always stays sequential.
pub const PARALLEL_POINT_THRESHOLD: usize = 5_000;

/// Returns the index of the centroid closest to `point` by squared
/// Euclidean distance, breaking ties toward the lowest index.
#[inline]
pub fn nearest_centroid(point: &ColorPoint, centroids: &[ColorPoint]) -> usize {
    if cfg!(feature = "portable_simd") && centroids.len() >= 4 {
        nearest_centroid_unrolled(point, centroids)
    } else {
        nearest_centroid_scalar(point, centroids)
    }
}

fn nearest_centroid_scalar(point: &ColorPoint, centroids: &[ColorPoint]) -> usize {
    let mut best_idx = 0usize;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = point.distance_sq(c);
        if d < best_dist {
            best_dist = d;
            best_idx = i;
        }
    }
    best_idx
}

/// Processes centroids four at a time. This produces identical results to
/// the scalar scan (same comparisons, same tie-break), just with the loop
/// unrolled the way a four-lane SIMD gather would be; it exists as the
/// non-`core::simd` fallback for the `portable_simd` feature and as a
/// documented hook for a real SIMD implementation to replace.
fn nearest_centroid_unrolled(point: &ColorPoint, centroids: &[ColorPoint]) -> usize {
    let mut best_idx = 0usize;
    let mut best_dist = f64::INFINITY;
    let chunks = centroids.chunks_exact(4);
    let remainder = chunks.remainder();
    let mut base = 0;
    for chunk in chunks {
        for (lane, c) in chunk.iter().enumerate() {
            let d = point.distance_sq(c);
            if d < best_dist {
                best_dist = d;
                best_idx = base + lane;
            }
        }
        base += 4;
    }
    for (lane, c) in remainder.iter().enumerate() {
        let d = point.distance_sq(c);
        if d < best_dist {
            best_dist = d;
            best_idx = base + lane;
        }
    }
    best_idx
}

/// Assigns every point in `points` to its nearest centroid, writing into
/// `assignments` (resized to `points.len()` if needed) and returning how
/// many assignments changed relative to the caller's previous vector.
///
/// Parallelizes the outer loop over points once `points.len()` exceeds
/// [`PARALLEL_POINT_THRESHOLD`]; the result is identical either way since
/// each point's assignment is independent of every other's.
pub fn assign_all(points: &[ColorPoint], centroids: &[ColorPoint], assignments: &mut Vec<usize>) -> usize {
    let previous = assignments.clone();
    assignments.clear();
    assignments.resize(points.len(), 0);

    #[cfg(feature = "rayon")]
    {
        if points.len() > PARALLEL_POINT_THRESHOLD {
            use rayon::prelude::*;
            assignments
                .par_iter_mut()
                .zip(points.par_iter())
                .for_each(|(slot, p)| *slot = nearest_centroid(p, centroids));
        } else {
            for (slot, p) in assignments.iter_mut().zip(points.iter()) {
                *slot = nearest_centroid(p, centroids);
            }
        }
    }
    #[cfg(not(feature = "rayon"))]
    {
        for (slot, p) in assignments.iter_mut().zip(points.iter()) {
            *slot = nearest_centroid(p, centroids);
        }
    }

    if previous.len() == assignments.len() {
        previous
            .iter()
            .zip(assignments.iter())
            .filter(|(a, b)| a != b)
            .count()
    } else {
        assignments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_nearest_of_two() {
        let point = ColorPoint::new(10.0, 10.0, 10.0);
        let centroids = vec![ColorPoint::new(0.0, 10.0, 10.0), ColorPoint::new(20.0, 10.0, 10.0)];
        assert_eq!(nearest_centroid(&point, &centroids), 0);
    }

    #[test]
    fn tie_breaks_to_lowest_index() {
        let point = ColorPoint::new(5.0, 5.0, 5.0);
        let centroids = vec![
            ColorPoint::new(0.0, 5.0, 5.0),
            ColorPoint::new(10.0, 5.0, 5.0),
            ColorPoint::new(0.0, 5.0, 5.0),
        ];
        assert_eq!(nearest_centroid(&point, &centroids), 0);
    }

    #[test]
    fn unrolled_matches_scalar_on_k_at_least_four() {
        let point = ColorPoint::new(3.0, 4.0, 5.0);
        let centroids: Vec<ColorPoint> = (0..17)
            .map(|i| ColorPoint::new(i as f64, (i * 2) as f64, (i % 5) as f64))
            .collect();
        assert_eq!(
            nearest_centroid_scalar(&point, &centroids),
            nearest_centroid_unrolled(&point, &centroids)
        );
    }

    #[test]
    fn assign_all_reports_change_count() {
        let points = vec![
            ColorPoint::new(0.0, 0.0, 0.0),
            ColorPoint::new(100.0, 100.0, 100.0),
        ];
        let centroids = vec![ColorPoint::new(0.0, 0.0, 0.0), ColorPoint::new(100.0, 100.0, 100.0)];
        let mut assignments = Vec::new();
        let changed = assign_all(&points, &centroids, &mut assignments);
        assert_eq!(changed, 2); // everything changed from empty state
        assert_eq!(assignments, vec![0, 1]);

        let changed_again = assign_all(&points, &centroids, &mut assignments);
        assert_eq!(changed_again, 0);
    }
}
