// portable_simd feature - only enable when the feature flag is set
#![cfg_attr(feature = "portable_simd", feature(portable_simd))]

//! A deterministic color-harmony engine: extract a palette from one image
//! and resynthesize another image's pixels onto it.
//!
//! `analyze` clusters a sampled pixel cloud (hybrid DBSCAN+k-means) into a
//! palette; `resynthesize` remaps every pixel of a target image from its
//! nearest target-palette color to the correspondence-matched source color,
//! preserving each pixel's offset within its own cluster. Every stage is
//! seeded by a single [`rng::Xorshift64`] stream, so the same input and
//! seed always produce the same output, independent of thread count.
//!
//! # Quick Start
//!
//! ```ignore
//! use palette_harmony::{Analyzer, WorkingSpace};
//!
//! let analyzer = Analyzer::new(WorkingSpace::CieLab);
//! let source_palette = analyzer.analyze(&source_image, 8)?;
//! let target_palette = analyzer.analyze(&target_image, 8)?;
//! let harmonized = analyzer.resynthesize(&target_image, &source_palette, &target_palette)?;
//! ```
//!
//! # Scope
//!
//! - **In scope**: palette extraction, palette-to-palette correspondence,
//!   pixel resynthesis, text palette export (`.gpl`, CSV).
//! - **Out of scope**: GUIs, image file codecs, file I/O, GPU offload.
//! - **Optional parallelism**: enable the `rayon` feature (on by default)
//!   for parallel batch color conversion and nearest-centroid assignment.

pub mod analysis;
pub mod clustering;
pub mod color;
pub mod export;
pub mod image;
pub mod palette;
pub mod resynth;
pub mod rng;
pub mod sampling;
pub mod tiling;
pub mod utils;

// Core façade
pub use analysis::{Analyzer, AnalyzerConfig};

// Color types
pub use color::{ColorPoint, WorkingSpace};

// Image types
pub use image::{Pixel, PixelBuffer};

// Palette types
pub use palette::ColorPalette;

// Clustering strategies (for callers who want to pick one directly)
pub use clustering::{Clusterer, DbscanClusterer, HybridClusterer, KMeansClusterer};

// Resynthesis options
pub use resynth::ResynthesizeOptions;

// Error types
pub use utils::error::{EngineError, Result};
