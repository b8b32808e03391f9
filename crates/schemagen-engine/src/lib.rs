//! Schemagen Engine - Orchestration layer
//!
//! Sequences snapshot retrieval, aggregation and emission into one
//! generation run. The snapshot provider is a collaborator supplied by the
//! caller; [`fixture::StaticSnapshotProvider`] is a YAML-backed provider for
//! tests and local runs.

pub mod commands;
pub mod fixture;
pub mod provider;

pub use commands::generate::{
    generate_types, verify_reproducible, GeneratedArtifact, GenerationReport, GenerationRun,
    RunState,
};
pub use fixture::StaticSnapshotProvider;
pub use provider::{ProviderError, SnapshotProvider};

/// Result type of engine operations, carrying the canonical error
pub type Result<T> = std::result::Result<T, schemagen_core::errors::ExError>;
