// src/tiling/mod.rs

//! Row-stripe tiling for large images.
//!
//! Above [`TILING_PIXEL_THRESHOLD`] pixels, resynthesis is driven tile by
//! tile instead of over the whole buffer at once, to bound peak working set.
//! Tiles are horizontal row stripes: each stripe writes disjoint output rows,
//! so stripes can run in any order, including in parallel, without any
//! cross-stripe coordination.

use crate::color::WorkingSpace;
use crate::image::PixelBuffer;
use crate::palette::{correspondence, ColorPalette};
use crate::resynth::{resynthesize, ResynthesizeOptions};
use crate::utils::error::Result;
use crate::utils::log::debug;

/// Images at or below this pixel count are resynthesized in a single pass.
pub const TILING_PIXEL_THRESHOLD: usize = 16_777_216; // 4096 x 4096

/// Target working-set size per tile, in bytes. Each pixel occupies 4 bytes
/// (packed ARGB) in both the input and output buffers, so a tile holds
/// roughly `TILE_WORKING_SET_BYTES / (width * 8)` rows.
pub const TILE_WORKING_SET_BYTES: usize = 256 * 1024 * 1024;

/// Computes the tile height (in rows) for an image of the given width, sized
/// so that input + output rows for one tile approximate
/// [`TILE_WORKING_SET_BYTES`]. Always at least 1 row, never more than the
/// image's total height is the caller's responsibility to clamp.
pub fn tile_height(width: u32) -> u32 {
    let bytes_per_row = width as usize * 4 * 2; // input + output, 4 bytes/pixel
    let rows = (TILE_WORKING_SET_BYTES / bytes_per_row.max(1)).max(1);
    rows as u32
}

/// Resynthesizes `image` using row-stripe tiling once its pixel count
/// exceeds [`TILING_PIXEL_THRESHOLD`]; below that, delegates directly to
/// [`resynthesize`] over the whole buffer. Each stripe is independent, so
/// this is eligible for parallel dispatch by the caller (the correspondence
/// is computed once up front and shared, since it is derived only from the
/// two palettes, not from any pixel data).
pub fn resynthesize_tiled(
    image: &PixelBuffer,
    source_palette: &ColorPalette,
    target_palette: &ColorPalette,
    working_space: WorkingSpace,
    options: ResynthesizeOptions,
) -> Result<PixelBuffer> {
    if image.pixel_count() <= TILING_PIXEL_THRESHOLD {
        return resynthesize(image, source_palette, target_palette, working_space, options);
    }

    // Validate the palettes once, up front, outside the per-tile loop.
    let _ = correspondence(source_palette, target_palette);

    let (width, height) = image.dimensions();
    let stripe_rows = tile_height(width).min(height.max(1));
    let tile_count = height.div_ceil(stripe_rows);

    debug!(
        "resynthesize_tiled: {}x{} image, {} rows/tile, {} tiles",
        width, height, stripe_rows, tile_count
    );

    let mut output_data = Vec::with_capacity(image.pixel_count());
    for tile_idx in 0..tile_count {
        let start_row = tile_idx * stripe_rows;
        let end_row = ((tile_idx + 1) * stripe_rows).min(height);

        let stripe_pixels = image.row_range(start_row, end_row).to_vec();
        let stripe_buffer = PixelBuffer::from_vec(width, end_row - start_row, stripe_pixels)?;
        let resynthesized_stripe = resynthesize(&stripe_buffer, source_palette, target_palette, working_space, options)?;
        output_data.extend_from_slice(resynthesized_stripe.pixels());
    }

    PixelBuffer::from_vec(width, height, output_data)
}
