//! Schemagen Core - schema-delta type generation kernel
//!
//! This crate turns entity schema snapshots into TypeScript type declarations
//! that keep extension contributions attributable:
//! - Entity/field data model with an ordered, lossless serde form
//! - Per-extension delta computation against the base schema
//! - Aggregation of every extension's delta into one emission plan
//! - Deterministic TypeScript emission and artifact digests
//! - Generator configuration, error facility and logging facility
//!
//! No snapshot resolution happens here; see the engine crate for the
//! provider seam and run orchestration.

pub mod config;
pub mod delta;
pub mod emit;
pub mod errors;
pub mod logging_facility;
pub mod model;

pub use schemagen_core_types as core_types;

// Re-export commonly used types
pub use config::{DuplicateIdPolicy, GeneratorConfig, NamingConfig};
pub use delta::{aggregate, compute_delta, AggregatedModel, EntityShape};
pub use emit::{assemble_artifact, compute_artifact_digest, emit_types};
pub use errors::{ExError, ExErrorKind, GenError, Result};
pub use model::{EntityFields, EntitySnapshot, ExtensionDescriptor, FieldAttribute, FieldType};
