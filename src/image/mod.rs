//! In-memory pixel buffer representation.
//!
//! This module provides a lightweight, custom [`PixelBuffer`] and packed
//! [`Pixel`] type. The engine never decodes or encodes an image file format
//! itself (see the crate's scope notes); it only consumes and produces a
//! rectangular, row-major buffer of packed 32-bit ARGB pixels.

pub mod pixel;

pub use pixel::{Pixel, PixelBuffer};
