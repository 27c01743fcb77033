// src/resynth/mod.rs

//! Resynthesis: remap a target image's pixels toward a source palette while
//! preserving each pixel's offset from its own cluster's centroid.
//!
//! For every pixel `p`, the nearest target-palette centroid `T[j]` is found,
//! the offset `delta = p - T[j]` is computed, and the output pixel is
//! `clamp(S[j] + delta, 0, 255)` where `S[j]` is the source color matched to
//! `T[j]` via [`crate::palette::correspondence`]. This keeps local detail
//! (the offset) while shifting the overall palette (the centroid swap).
//! Alpha is carried through untouched.

use crate::clustering::nearest::nearest_centroid;
use crate::color::{lab_to_rgb, rgb_to_lab, ColorPoint, WorkingSpace};
use crate::image::{Pixel, PixelBuffer};
use crate::palette::{correspondence, ColorPalette};
use crate::utils::error::{EngineError, Result};
use crate::utils::log::debug;

/// LUT resolution per channel (128 buckets spanning `[0, 256)`).
pub const LUT_RESOLUTION: usize = 128;
/// LUT is only built when the target palette has at most this many colors.
pub const LUT_MAX_PALETTE_SIZE: usize = 256;
/// LUT is only worth building above this many pixels.
pub const LUT_MIN_PIXEL_COUNT: usize = 10_000;

/// Options controlling a single [`resynthesize`] call.
#[derive(Debug, Clone, Copy)]
pub struct ResynthesizeOptions {
    /// When `true`, the centroid offset is dropped and each pixel becomes
    /// exactly its matched source color (posterization).
    pub posterize: bool,
    /// When `true` (and eligible), a quantized nearest-centroid LUT is built
    /// up front instead of doing a direct per-pixel search. Eligibility
    /// requires the target palette to have at most [`LUT_MAX_PALETTE_SIZE`]
    /// colors and the image to have at least [`LUT_MIN_PIXEL_COUNT`] pixels;
    /// ineligible calls silently fall back to direct search.
    pub use_lut: bool,
}

impl Default for ResynthesizeOptions {
    fn default() -> Self {
        ResynthesizeOptions {
            posterize: false,
            use_lut: true,
        }
    }
}

/// A precomputed nearest-centroid lookup table over a quantized RGB grid.
/// Keyed by the top 7 bits of each channel (`value >> 1`, since channel
/// values are 8-bit and `128 = 2^7`), giving a [`LUT_RESOLUTION`]^3 table of
/// palette indices.
pub struct Lut {
    indices: Vec<u16>,
}

impl Lut {
    /// Builds the table, keyed by quantized RGB buckets but searched against
    /// `centroids` in whatever `working_space` those centroids live in (each
    /// RGB bucket sample is converted before the nearest-centroid search,
    /// exactly as a direct-search pixel would be). Fails with
    /// [`EngineError::ResourceExhausted`] if the backing allocation cannot be
    /// made — surfaced to the caller rather than silently falling back to
    /// direct search.
    pub fn build(centroids: &[ColorPoint], working_space: WorkingSpace) -> Result<Self> {
        let cell_count = LUT_RESOLUTION * LUT_RESOLUTION * LUT_RESOLUTION;
        let mut indices = Vec::new();
        indices.try_reserve_exact(cell_count).map_err(|e| {
            EngineError::ResourceExhausted(format!("failed to allocate resynthesis LUT: {e}"))
        })?;
        indices.resize(cell_count, 0u16);

        for r in 0..LUT_RESOLUTION {
            for g in 0..LUT_RESOLUTION {
                for b in 0..LUT_RESOLUTION {
                    // Map the bucket back to its representative full-range
                    // sample (bucket midpoint, scaled by 2 since 128 buckets
                    // span 256 levels) before searching.
                    let rgb_sample = ColorPoint::new((r * 2) as f64, (g * 2) as f64, (b * 2) as f64);
                    let sample = match working_space {
                        WorkingSpace::Rgb => rgb_sample,
                        WorkingSpace::CieLab => rgb_to_lab(&rgb_sample),
                    };
                    let idx = nearest_centroid(&sample, centroids);
                    indices[lut_key(r, g, b)] = idx as u16;
                }
            }
        }
        Ok(Lut { indices })
    }

    fn lookup(&self, pixel: Pixel) -> usize {
        let r = (pixel.r() >> 1) as usize;
        let g = (pixel.g() >> 1) as usize;
        let b = (pixel.b() >> 1) as usize;
        self.indices[lut_key(r, g, b)] as usize
    }
}

fn lut_key(r: usize, g: usize, b: usize) -> usize {
    (r * LUT_RESOLUTION + g) * LUT_RESOLUTION + b
}

/// [`correspondence`] maps each source index to its matched target index;
/// resynthesis walks pixels by their nearest *target* centroid and needs the
/// reverse direction. Inverts the forward map, keeping the lowest source
/// index when more than one source matches the same target (as happens once
/// `nearest_unused_then_nearest` starts reusing targets), and falling back to
/// a direct nearest-color lookup for any target no source was matched to
/// (possible when `target.len() > source.len()`).
fn target_to_source(source: &ColorPalette, target: &ColorPalette, matches: &[usize]) -> Vec<usize> {
    let mut inverse: Vec<Option<usize>> = vec![None; target.len()];
    for (source_idx, &target_idx) in matches.iter().enumerate() {
        inverse[target_idx].get_or_insert(source_idx);
    }
    inverse
        .into_iter()
        .enumerate()
        .map(|(target_idx, maybe_source)| maybe_source.unwrap_or_else(|| source.nearest(&target.get(target_idx))))
        .collect()
}

/// Resynthesizes `image` by remapping each pixel from its nearest
/// `target_palette` centroid to the corresponding `source_palette` color,
/// preserving the pixel's offset within its cluster (unless
/// `options.posterize` is set). Fails with [`EngineError::InvalidPalette`]
/// if either palette is empty.
///
/// Per §4.9/§4.10, the nearest-centroid search and the offset arithmetic
/// both happen in `working_space`: when it is [`WorkingSpace::CieLab`], both
/// palettes and every pixel are converted to L*a*b* before any distance or
/// delta is computed, and the result is converted back to RGB (the only
/// space a [`Pixel`] can store) before being written out.
pub fn resynthesize(
    image: &PixelBuffer,
    source_palette: &ColorPalette,
    target_palette: &ColorPalette,
    working_space: WorkingSpace,
    options: ResynthesizeOptions,
) -> Result<PixelBuffer> {
    if source_palette.is_empty() || target_palette.is_empty() {
        return Err(EngineError::InvalidPalette(
            "resynthesize requires non-empty source and target palettes".to_string(),
        ));
    }

    let (source_working, target_working) = match working_space {
        WorkingSpace::Rgb => (source_palette.clone(), target_palette.clone()),
        WorkingSpace::CieLab => (
            ColorPalette::new(source_palette.colors().iter().map(rgb_to_lab).collect()),
            ColorPalette::new(target_palette.colors().iter().map(rgb_to_lab).collect()),
        ),
    };

    let forward_matches = correspondence(&source_working, &target_working);
    let matches = target_to_source(&source_working, &target_working, &forward_matches);
    let target_centroids = target_working.colors();
    let pixel_count = image.pixel_count();

    let lut = if options.use_lut
        && target_working.len() <= LUT_MAX_PALETTE_SIZE
        && pixel_count >= LUT_MIN_PIXEL_COUNT
    {
        Some(Lut::build(target_centroids, working_space)?)
    } else {
        None
    };

    debug!(
        "resynthesize: {} pixels, {} target colors, posterize={}, lut={}, working_space={:?}",
        pixel_count,
        target_working.len(),
        options.posterize,
        lut.is_some(),
        working_space
    );

    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        let (r, g, b) = pixel.rgb_f64();
        let rgb_point = ColorPoint::new(r, g, b);
        let working_point = match working_space {
            WorkingSpace::Rgb => rgb_point,
            WorkingSpace::CieLab => rgb_to_lab(&rgb_point),
        };

        let nearest_target_idx = match &lut {
            Some(table) => table.lookup(*pixel),
            None => nearest_centroid(&working_point, target_centroids),
        };
        let source_idx = matches[nearest_target_idx];
        let source_color_working = source_working.get(source_idx);

        let resynthesized_working = if options.posterize {
            source_color_working
        } else {
            let target_centroid = target_centroids[nearest_target_idx];
            let delta = working_point.sub(&target_centroid);
            source_color_working.add(&delta)
        };

        let resynthesized_rgb = match working_space {
            WorkingSpace::Rgb => resynthesized_working,
            WorkingSpace::CieLab => lab_to_rgb(&resynthesized_working),
        };

        *pixel = Pixel::from_rgb_f64_with_alpha(
            resynthesized_rgb.c1,
            resynthesized_rgb.c2,
            resynthesized_rgb.c3,
            pixel.a(),
        );
    }

    Ok(output)
}
