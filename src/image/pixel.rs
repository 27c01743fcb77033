// src/image/pixel.rs

//! Packed-pixel representation and the rectangular buffer it lives in.
//!
//! This replaces a dependency on an image-decoding crate with a lightweight,
//! custom implementation optimized for the clustering/resynthesis pipeline:
//! a `Pixel` is a transparent wrapper over a packed `u32` (bits 24-31 alpha,
//! 16-23 red, 8-15 green, 0-7 blue), and `PixelBuffer` is a row-major `Vec`
//! of them.

use crate::utils::error::{EngineError, Result};
use bytemuck::{Pod, Zeroable};

/// A single packed ARGB pixel. Bits 24-31 are alpha, 16-23 red, 8-15 green,
/// 0-7 blue. Alpha is carried through every transform untouched.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct Pixel(pub u32);

impl Pixel {
    pub fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Pixel(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Pixel::from_argb(255, r, g, b)
    }

    #[inline]
    pub fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Returns `(r, g, b)` as `f64`, suitable for construction of a
    /// `ColorPoint` in the RGB working space.
    pub fn rgb_f64(self) -> (f64, f64, f64) {
        (self.r() as f64, self.g() as f64, self.b() as f64)
    }

    /// Rebuilds a pixel from RGB components (each clamped to `[0, 255]`)
    /// and an alpha byte carried through from elsewhere.
    pub fn from_rgb_f64_with_alpha(r: f64, g: f64, b: f64, a: u8) -> Self {
        Pixel::from_argb(
            a,
            r.round().clamp(0.0, 255.0) as u8,
            g.round().clamp(0.0, 255.0) as u8,
            b.round().clamp(0.0, 255.0) as u8,
        )
    }
}

/// A rectangular, row-major buffer of packed pixels.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<Pixel>,
}

impl PixelBuffer {
    /// Creates a buffer from a raw row-major pixel vector. Fails with
    /// [`EngineError::InvalidInput`] if the dimensions are non-positive or
    /// the vector's length does not match `width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<Pixel>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidInput(
                "image width and height must be strictly positive".to_string(),
            ));
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(EngineError::InvalidInput(format!(
                "pixel buffer has {} pixels, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(PixelBuffer { width, height, data })
    }

    pub fn from_pixel(width: u32, height: u32, pixel: Pixel) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidInput(
                "image width and height must be strictly positive".to_string(),
            ));
        }
        Ok(PixelBuffer {
            width,
            height,
            data: vec![pixel; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, x: u32, y: u32) -> Pixel {
        self.data[(y * self.width + x) as usize]
    }

    pub fn put(&mut self, x: u32, y: u32, pixel: Pixel) {
        self.data[(y * self.width + x) as usize] = pixel;
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.data
    }

    /// Returns the row range `[start, end)` as a sub-slice of pixels.
    pub fn row_range(&self, start_row: u32, end_row: u32) -> &[Pixel] {
        let start = start_row as usize * self.width as usize;
        let end = end_row as usize * self.width as usize;
        &self.data[start..end]
    }

    pub fn row_range_mut(&mut self, start_row: u32, end_row: u32) -> &mut [Pixel] {
        let start = start_row as usize * self.width as usize;
        let end = end_row as usize * self.width as usize;
        &mut self.data[start..end]
    }
}
