// src/color/mod.rs

//! Color-space conversion and distance for the clustering/resynthesis
//! pipeline.
//!
//! [`ColorPoint`] is an immutable triple of `f64` components. Which working
//! space its components live in (RGB in `[0, 255]`, or CIE L*a*b* with
//! `c1` in `[0, 100]` and `c2`, `c3` in `[-128, 128]`) is never carried on
//! the value itself; every API that cares is parameterized by a
//! [`WorkingSpace`] instead. All hot-path distance computation uses squared
//! Euclidean distance; `sqrt` is reserved for the reference-only CIEDE2000
//! metric.

use std::fmt;

/// Which color space clustering and resynthesis arithmetic runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingSpace {
    /// Raw RGB components in `[0, 255]`. Faster, less perceptually uniform.
    Rgb,
    /// CIE L*a*b*. Slower to convert into, better perceptual clustering.
    CieLab,
}

/// An immutable point in whichever [`WorkingSpace`] the caller is using.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPoint {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

impl ColorPoint {
    pub fn new(c1: f64, c2: f64, c3: f64) -> Self {
        ColorPoint { c1, c2, c3 }
    }

    pub fn zero() -> Self {
        ColorPoint::new(0.0, 0.0, 0.0)
    }

    /// Component-wise sum.
    pub fn add(&self, other: &ColorPoint) -> ColorPoint {
        ColorPoint::new(self.c1 + other.c1, self.c2 + other.c2, self.c3 + other.c3)
    }

    /// Component-wise difference (`self - other`).
    pub fn sub(&self, other: &ColorPoint) -> ColorPoint {
        ColorPoint::new(self.c1 - other.c1, self.c2 - other.c2, self.c3 - other.c3)
    }

    /// Uniform scalar scale.
    pub fn scale(&self, factor: f64) -> ColorPoint {
        ColorPoint::new(self.c1 * factor, self.c2 * factor, self.c3 * factor)
    }

    /// Squared Euclidean distance to `other`. This is the only distance
    /// metric used on centroid-assignment hot paths; `sqrt` is avoided.
    #[inline]
    pub fn distance_sq(&self, other: &ColorPoint) -> f64 {
        let d1 = self.c1 - other.c1;
        let d2 = self.c2 - other.c2;
        let d3 = self.c3 - other.c3;
        d1 * d1 + d2 * d2 + d3 * d3
    }

    pub fn is_finite(&self) -> bool {
        self.c1.is_finite() && self.c2.is_finite() && self.c3.is_finite()
    }

    /// Clamps each component independently to the given per-channel bounds.
    pub fn clamp(&self, lo: (f64, f64, f64), hi: (f64, f64, f64)) -> ColorPoint {
        ColorPoint::new(
            self.c1.clamp(lo.0, hi.0),
            self.c2.clamp(lo.1, hi.1),
            self.c3.clamp(lo.2, hi.2),
        )
    }
}

impl fmt::Display for ColorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.c1, self.c2, self.c3)
    }
}

// --- sRGB <-> linear ---

const SRGB_GAMMA_THRESHOLD: f64 = 0.04045;
const SRGB_LINEAR_THRESHOLD: f64 = 0.0031308;

fn srgb_to_linear_channel(c: f64) -> f64 {
    let c_prime = c / 255.0;
    if c_prime > SRGB_GAMMA_THRESHOLD {
        ((c_prime + 0.055) / 1.055).powf(2.4)
    } else {
        c_prime / 12.92
    }
}

fn linear_to_srgb_channel(c: f64) -> f64 {
    let v = if c > SRGB_LINEAR_THRESHOLD {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    } else {
        c * 12.92
    };
    (v * 255.0).clamp(0.0, 255.0)
}

// --- D65 reference white and the linear RGB <-> XYZ matrix ---

const XN: f64 = 95.047;
const YN: f64 = 100.000;
const ZN: f64 = 108.883;

const EPSILON: f64 = 216.0 / 24389.0;
const KAPPA: f64 = 24389.0 / 27.0;

fn linear_to_xyz(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let x = (0.4124564 * r + 0.3575761 * g + 0.1804375 * b) * 100.0;
    let y = (0.2126729 * r + 0.7151522 * g + 0.0721750 * b) * 100.0;
    let z = (0.0193339 * r + 0.1191920 * g + 0.9503041 * b) * 100.0;
    (x, y, z)
}

fn xyz_to_linear(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let x = x / 100.0;
    let y = y / 100.0;
    let z = z / 100.0;
    let r = 3.2404542 * x - 1.5371385 * y - 0.4985314 * z;
    let g = -0.9692660 * x + 1.8760108 * y + 0.0415560 * z;
    let b = 0.0556434 * x - 0.2040259 * y + 1.0572252 * z;
    (r, g, b)
}

fn lab_f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    let t3 = t * t * t;
    if t3 > EPSILON {
        t3
    } else {
        (116.0 * t - 16.0) / KAPPA
    }
}

/// Converts one integer-or-fractional sRGB point to CIE L*a*b*.
pub fn rgb_to_lab(rgb: &ColorPoint) -> ColorPoint {
    let r = srgb_to_linear_channel(rgb.c1);
    let g = srgb_to_linear_channel(rgb.c2);
    let b = srgb_to_linear_channel(rgb.c3);
    let (x, y, z) = linear_to_xyz(r, g, b);

    let fx = lab_f(x / XN);
    let fy = lab_f(y / YN);
    let fz = lab_f(z / ZN);

    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let bb = 200.0 * (fy - fz);
    ColorPoint::new(l, a, bb)
}

/// Inverse of [`rgb_to_lab`]. Output is clamped to `[0, 255]` per channel.
pub fn lab_to_rgb(lab: &ColorPoint) -> ColorPoint {
    let fy = (lab.c1 + 16.0) / 116.0;
    let fx = fy + lab.c2 / 500.0;
    let fz = fy - lab.c3 / 200.0;

    let x = XN * lab_f_inv(fx);
    let y = YN * lab_f_inv(fy);
    let z = ZN * lab_f_inv(fz);

    let (r, g, b) = xyz_to_linear(x, y, z);
    ColorPoint::new(
        linear_to_srgb_channel(r),
        linear_to_srgb_channel(g),
        linear_to_srgb_channel(b),
    )
}

/// Converts a batch of points, preserving order and performing no
/// cross-pixel interaction. Parallelized via rayon once the batch is large
/// enough that the thread-pool dispatch overhead is worth paying.
const BATCH_PARALLEL_THRESHOLD: usize = 1000;

pub fn batch_rgb_to_lab(points: &[ColorPoint]) -> Vec<ColorPoint> {
    batch_convert(points, rgb_to_lab)
}

pub fn batch_lab_to_rgb(points: &[ColorPoint]) -> Vec<ColorPoint> {
    batch_convert(points, lab_to_rgb)
}

fn batch_convert(points: &[ColorPoint], f: impl Fn(&ColorPoint) -> ColorPoint + Sync) -> Vec<ColorPoint> {
    #[cfg(feature = "rayon")]
    {
        if points.len() > BATCH_PARALLEL_THRESHOLD {
            use rayon::prelude::*;
            return points.par_iter().map(|p| f(p)).collect();
        }
    }
    points.iter().map(|p| f(p)).collect()
}

/// CIEDE2000 perceptual distance between two L*a*b* points. Reference/export
/// use only — never called on the centroid-assignment hot path, which uses
/// [`ColorPoint::distance_sq`] instead.
pub fn ciede2000(lab1: &ColorPoint, lab2: &ColorPoint) -> f64 {
    let (l1, a1, b1) = (lab1.c1, lab1.c2, lab1.c3);
    let (l2, a2, b2) = (lab2.c1, lab2.c2, lab2.c3);

    let c1 = (a1 * a1 + b1 * b1).sqrt();
    let c2 = (a2 * a2 + b2 * b2).sqrt();
    let c_bar = (c1 + c2) / 2.0;

    let c_bar7 = c_bar.powi(7);
    let g = 0.5 * (1.0 - (c_bar7 / (c_bar7 + 25f64.powi(7))).sqrt());

    let a1_prime = a1 * (1.0 + g);
    let a2_prime = a2 * (1.0 + g);

    let c1_prime = (a1_prime * a1_prime + b1 * b1).sqrt();
    let c2_prime = (a2_prime * a2_prime + b2 * b2).sqrt();

    let h1_prime = hue_angle(b1, a1_prime);
    let h2_prime = hue_angle(b2, a2_prime);

    let delta_l_prime = l2 - l1;
    let delta_c_prime = c2_prime - c1_prime;

    let delta_h_prime = if c1_prime * c2_prime == 0.0 {
        0.0
    } else {
        let mut dh = h2_prime - h1_prime;
        if dh > 180.0 {
            dh -= 360.0;
        } else if dh < -180.0 {
            dh += 360.0;
        }
        dh
    };
    let delta_big_h_prime =
        2.0 * (c1_prime * c2_prime).sqrt() * (delta_h_prime.to_radians() / 2.0).sin();

    let l_bar_prime = (l1 + l2) / 2.0;
    let c_bar_prime = (c1_prime + c2_prime) / 2.0;

    let h_bar_prime = if c1_prime * c2_prime == 0.0 {
        h1_prime + h2_prime
    } else if (h1_prime - h2_prime).abs() <= 180.0 {
        (h1_prime + h2_prime) / 2.0
    } else if h1_prime + h2_prime < 360.0 {
        (h1_prime + h2_prime + 360.0) / 2.0
    } else {
        (h1_prime + h2_prime - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_bar_prime - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_bar_prime).to_radians().cos()
        + 0.32 * (3.0 * h_bar_prime + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_bar_prime - 63.0).to_radians().cos();

    let delta_theta = 30.0 * (-((h_bar_prime - 275.0) / 25.0).powi(2)).exp();
    let r_c = 2.0 * (c_bar_prime.powi(7) / (c_bar_prime.powi(7) + 25f64.powi(7))).sqrt();
    let s_l = 1.0 + (0.015 * (l_bar_prime - 50.0).powi(2)) / (20.0 + (l_bar_prime - 50.0).powi(2)).sqrt();
    let s_c = 1.0 + 0.045 * c_bar_prime;
    let s_h = 1.0 + 0.015 * c_bar_prime * t;
    let r_t = -r_c * (2.0 * delta_theta.to_radians()).sin();

    let kl = 1.0;
    let kc = 1.0;
    let kh = 1.0;

    let term_l = delta_l_prime / (kl * s_l);
    let term_c = delta_c_prime / (kc * s_c);
    let term_h = delta_big_h_prime / (kh * s_h);

    (term_l * term_l + term_c * term_c + term_h * term_h + r_t * term_c * term_h).sqrt()
}

fn hue_angle(b: f64, a_prime: f64) -> f64 {
    if a_prime == 0.0 && b == 0.0 {
        return 0.0;
    }
    let angle = b.atan2(a_prime).to_degrees();
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b} +/- {tol}, got {a}");
    }

    #[test]
    fn black_maps_to_zero_lab() {
        let lab = rgb_to_lab(&ColorPoint::new(0.0, 0.0, 0.0));
        assert_close(lab.c1, 0.0, 1e-6);
        assert_close(lab.c2, 0.0, 1e-6);
        assert_close(lab.c3, 0.0, 1e-6);
    }

    #[test]
    fn white_maps_to_l_100() {
        let lab = rgb_to_lab(&ColorPoint::new(255.0, 255.0, 255.0));
        assert_close(lab.c1, 100.0, 0.5);
        assert_close(lab.c2, 0.0, 0.5);
        assert_close(lab.c3, 0.0, 0.5);
    }

    #[test]
    fn pure_red_matches_reference_lab() {
        let lab = rgb_to_lab(&ColorPoint::new(255.0, 0.0, 0.0));
        assert_close(lab.c1, 53.23, 1.0);
        assert_close(lab.c2, 80.11, 1.0);
        assert_close(lab.c3, 67.22, 1.0);
    }

    #[test]
    fn roundtrip_stays_within_tolerance_for_every_integer_rgb_sample() {
        // Exhaustive over a fixed grid of integer RGB values (every 17th
        // level per channel keeps the suite fast while still covering the
        // full cube's corners and midpoints).
        for r in (0..=255u32).step_by(17) {
            for g in (0..=255u32).step_by(17) {
                for b in (0..=255u32).step_by(17) {
                    let original = ColorPoint::new(r as f64, g as f64, b as f64);
                    let roundtripped = lab_to_rgb(&rgb_to_lab(&original));
                    let dist = original.distance_sq(&roundtripped).sqrt();
                    assert!(
                        dist <= 2.0,
                        "roundtrip error {dist} too large for {original}"
                    );
                }
            }
        }
    }

    #[test]
    fn batch_conversion_matches_elementwise() {
        let points: Vec<ColorPoint> = (0..50)
            .map(|i| ColorPoint::new((i * 5) as f64, (i * 3) as f64, (i * 2) as f64))
            .collect();
        let batch = batch_rgb_to_lab(&points);
        for (p, b) in points.iter().zip(batch.iter()) {
            let expected = rgb_to_lab(p);
            assert_close(b.c1, expected.c1, 1e-9);
            assert_close(b.c2, expected.c2, 1e-9);
            assert_close(b.c3, expected.c3, 1e-9);
        }
    }

    #[test]
    fn ciede2000_identical_colors_is_zero() {
        let lab = rgb_to_lab(&ColorPoint::new(120.0, 45.0, 200.0));
        assert_close(ciede2000(&lab, &lab), 0.0, 1e-9);
    }

    #[test]
    fn ciede2000_is_symmetric() {
        let lab1 = rgb_to_lab(&ColorPoint::new(10.0, 200.0, 30.0));
        let lab2 = rgb_to_lab(&ColorPoint::new(250.0, 10.0, 90.0));
        assert_close(ciede2000(&lab1, &lab2), ciede2000(&lab2, &lab1), 1e-9);
    }

    #[test]
    fn distance_sq_matches_manual_computation() {
        let a = ColorPoint::new(1.0, 2.0, 3.0);
        let b = ColorPoint::new(4.0, 6.0, 8.0);
        assert_close(a.distance_sq(&b), 9.0 + 16.0 + 25.0, 1e-9);
    }
}
