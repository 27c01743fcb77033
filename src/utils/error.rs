// src/utils/error.rs

//! The error taxonomy for the palette/resynthesis engine.
//!
//! Every public entry point returns [`Result`]. The variants mirror the
//! taxonomy in the engine's design notes: invalid caller input and palette
//! mismatches are always surfaced; degenerate but well-formed data
//! (all-identical points, fewer distinct colors than `k`) is recovered
//! locally by the clustering layer and never produces an `EngineError`.

use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Null/empty image, non-positive dimensions, or `k <= 0`.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Palette sizes disagree where equality is required, or a palette
    /// contains non-finite components.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// Allocation failure building a spatial grid or a LUT. Never silently
    /// downgraded to a lower-quality code path.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
}

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
