//! Command orchestration layer.
//!
//! Coordinates the snapshot provider with the core kernel to produce the
//! generated artifact.

pub mod generate;
