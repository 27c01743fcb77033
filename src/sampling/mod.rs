// src/sampling/mod.rs

//! Reservoir sampling over a stream of colors.
//!
//! Used to cap the number of points the clustering stage has to look at
//! (the analysis façade's `pixelSampleCap`). Two entry points are provided:
//! one over an already-unpacked [`ColorPoint`] sequence, and one that reads
//! straight out of a packed [`PixelBuffer`], unpacking RGB as it goes.
//!
//! Both consume the RNG in a fixed order (index 0..N, one draw per item once
//! past the prefill) so that sampling the same stream with the same seed
//! always yields the same reservoir, independent of how the caller invokes
//! it.

use crate::color::ColorPoint;
use crate::image::PixelBuffer;
use crate::rng::Xorshift64;

/// Reservoir-samples `size` points out of `points`. If `points.len() <=
/// size`, returns a copy of every point.
pub fn reservoir_sample_points(points: &[ColorPoint], size: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
    reservoir_sample_with(points.len(), size, rng, |i| points[i])
}

/// Reservoir-samples `size` pixels directly out of a packed pixel buffer,
/// unpacking each selected pixel's RGB components into a [`ColorPoint`].
pub fn reservoir_sample_pixels(buffer: &PixelBuffer, size: usize, rng: &mut Xorshift64) -> Vec<ColorPoint> {
    let pixels = buffer.pixels();
    reservoir_sample_with(pixels.len(), size, rng, |i| {
        let (r, g, b) = pixels[i].rgb_f64();
        ColorPoint::new(r, g, b)
    })
}

/// Generic reservoir sampling over `n` conceptual items, materializing each
/// selected item lazily through `item_at`. Algorithm R: prefill the first
/// `size` items, then for `i` in `[size, n)` draw `j = uniform(i + 1)`; if
/// `j < size`, replace `reservoir[j]`.
fn reservoir_sample_with<F>(n: usize, size: usize, rng: &mut Xorshift64, item_at: F) -> Vec<ColorPoint>
where
    F: Fn(usize) -> ColorPoint,
{
    if size == 0 || n == 0 {
        return Vec::new();
    }
    if n <= size {
        return (0..n).map(&item_at).collect();
    }

    let mut reservoir: Vec<ColorPoint> = (0..size).map(&item_at).collect();
    for i in size..n {
        let j = rng.uniform_usize(i + 1);
        if j < size {
            reservoir[j] = item_at(i);
        }
    }
    reservoir
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Pixel;

    #[test]
    fn copies_everything_when_stream_is_small() {
        let points = vec![ColorPoint::new(1.0, 1.0, 1.0); 3];
        let mut rng = Xorshift64::new(1);
        let sample = reservoir_sample_points(&points, 10, &mut rng);
        assert_eq!(sample.len(), 3);
    }

    #[test]
    fn caps_reservoir_at_requested_size() {
        let points: Vec<ColorPoint> = (0..1000)
            .map(|i| ColorPoint::new(i as f64, 0.0, 0.0))
            .collect();
        let mut rng = Xorshift64::new(42);
        let sample = reservoir_sample_points(&points, 100, &mut rng);
        assert_eq!(sample.len(), 100);
    }

    #[test]
    fn same_seed_produces_identical_reservoir() {
        let points: Vec<ColorPoint> = (0..1000)
            .map(|i| ColorPoint::new(i as f64, 0.0, 0.0))
            .collect();
        let mut rng_a = Xorshift64::new(7);
        let mut rng_b = Xorshift64::new(7);
        let sample_a = reservoir_sample_points(&points, 50, &mut rng_a);
        let sample_b = reservoir_sample_points(&points, 50, &mut rng_b);
        assert_eq!(sample_a, sample_b);
    }

    #[test]
    fn pixel_entry_point_unpacks_rgb() {
        let data: Vec<Pixel> = (0..16u8).map(|i| Pixel::from_rgb(i, i, i)).collect();
        let buf = PixelBuffer::from_vec(4, 4, data).unwrap();
        let mut rng = Xorshift64::new(3);
        let sample = reservoir_sample_pixels(&buf, 8, &mut rng);
        assert_eq!(sample.len(), 8);
        for p in sample {
            assert_eq!(p.c1, p.c2);
            assert_eq!(p.c2, p.c3);
        }
    }

    #[test]
    fn zero_size_returns_empty() {
        let points = vec![ColorPoint::new(1.0, 1.0, 1.0); 5];
        let mut rng = Xorshift64::new(1);
        assert!(reservoir_sample_points(&points, 0, &mut rng).is_empty());
    }
}
