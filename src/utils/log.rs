// src/utils/log.rs

//! Structured logging for the engine, built on the `log` facade.
//!
//! The crate never initializes a logger itself — a library should not pick
//! a global subscriber for its caller. It only emits `log::debug!`/`info!`
//! records at stage boundaries (block counts, chosen epsilon, iterations
//! reached). Binaries and tests that want to see them install their own
//! logger, e.g. `env_logger::init()`.

pub use log::{debug, error, info, trace, warn, Level};
