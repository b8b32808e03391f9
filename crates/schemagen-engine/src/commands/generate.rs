//! One-shot generation run.
//!
//! ## Pipeline (in order):
//! 1. Validate descriptor ids and apply the duplicate-id policy
//! 2. Base snapshot (no extension active)
//! 3. One isolated snapshot per extension, strictly in declaration order
//! 4. Aggregate deltas and plan entities
//! 5. Emit declarations and assemble the artifact behind the header
//!
//! Any provider failure aborts the run with no partial output.

use crate::provider::SnapshotProvider;
use crate::Result;
use schemagen_core::config::{DuplicateIdPolicy, GeneratorConfig};
use schemagen_core::delta::{aggregate, DroppedExtension, FieldRedefinition};
use schemagen_core::emit::{
    assemble_artifact, compute_artifact_digest, emit_types, WireNameCollision,
};
use schemagen_core::errors::{ExError, GenError};
use schemagen_core::model::{EntitySnapshot, ExtensionDescriptor};
use schemagen_core::{log_op_end, log_op_error, log_op_start};
use schemagen_core_types::RunId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Lifecycle of a generation run. There are no intermediate checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// What a run evaluated, dropped and degraded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub run_id: RunId,
    /// Extension ids evaluated, in declaration order
    pub extension_ids: Vec<String>,
    pub dropped_duplicates: Vec<DroppedExtension>,
    /// Base fields an extension redefined; the base definition was emitted
    pub redefinitions: Vec<FieldRedefinition>,
    /// Emitted members that fell back to `unknown`
    pub unknown_field_count: usize,
    /// Field keys left out because an earlier key in the same table
    /// already claimed their on-wire name
    pub wire_name_collisions: Vec<WireNameCollision>,
    /// Emitted entity wire names, in emission order
    pub entities: Vec<String>,
}

/// The generated text and its digest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedArtifact {
    pub text: String,
    /// Hex SHA-256 of `text`
    pub digest: String,
    pub report: GenerationReport,
}

/// A single generation run over one provider and descriptor list.
pub struct GenerationRun<'a, P: SnapshotProvider> {
    run_id: RunId,
    provider: &'a P,
    extensions: &'a [ExtensionDescriptor<P::Activation>],
    config: &'a GeneratorConfig,
    state: RunState,
}

impl<'a, P: SnapshotProvider> GenerationRun<'a, P> {
    pub fn new(
        provider: &'a P,
        extensions: &'a [ExtensionDescriptor<P::Activation>],
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            provider,
            extensions,
            config,
            state: RunState::Idle,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// - `InvalidState` when the run already executed
    /// - `InvalidInput` for an empty extension id
    /// - `DuplicateExtensionId` when ids repeat under the reject policy
    /// - `SnapshotFailure` when the provider fails (carries the extension id)
    ///
    /// Every error carries this run's id.
    pub fn execute(&mut self) -> Result<GeneratedArtifact> {
        if self.state != RunState::Idle {
            return Err(ExError::from(GenError::InvalidRunState {
                state: format!("{:?}", self.state),
            })
            .with_op("generate_types")
            .with_run_id(self.run_id.clone()));
        }

        let start = Instant::now();
        self.state = RunState::Running;
        log_op_start!(
            "generate_types",
            run_id = self.run_id.as_str(),
            extension_count = self.extensions.len()
        );

        match self.run_pipeline() {
            Ok(artifact) => {
                self.state = RunState::Succeeded;
                let duration_ms = start.elapsed().as_millis() as u64;
                log_op_end!(
                    "generate_types",
                    duration_ms = duration_ms,
                    run_id = self.run_id.as_str(),
                    digest = artifact.digest.as_str()
                );
                Ok(artifact)
            }
            Err(err) => {
                self.state = RunState::Failed;
                let err = err.with_run_id(self.run_id.clone());
                let duration_ms = start.elapsed().as_millis() as u64;
                log_op_error!(
                    "generate_types",
                    err.clone(),
                    duration_ms = duration_ms,
                    run_id = self.run_id.as_str()
                );
                Err(err)
            }
        }
    }

    fn run_pipeline(&self) -> Result<GeneratedArtifact> {
        let (active, dropped) = self.select_extensions()?;

        let base = self.snapshot_base()?;
        let mut snapshots: Vec<(String, EntitySnapshot)> = Vec::with_capacity(active.len());
        for descriptor in active {
            let snapshot = self.snapshot_extension(descriptor)?;
            snapshots.push((descriptor.id.clone(), snapshot));
        }

        let model = aggregate(&base, &snapshots);
        let emitted = emit_types(&base, &model, &self.config.naming);
        let text = assemble_artifact(&self.config.header, &emitted.declarations);
        let digest = compute_artifact_digest(&text);

        let mut dropped_duplicates = dropped;
        dropped_duplicates.extend(model.dropped_duplicates.iter().cloned());
        let report = GenerationReport {
            run_id: self.run_id.clone(),
            extension_ids: model.extension_ids.clone(),
            dropped_duplicates,
            redefinitions: model.redefinitions.clone(),
            unknown_field_count: emitted.unknown_field_count,
            wire_name_collisions: emitted.wire_name_collisions,
            entities: model.entity_names().into_iter().map(str::to_string).collect(),
        };

        Ok(GeneratedArtifact {
            text,
            digest,
            report,
        })
    }

    /// Descriptors to evaluate, first occurrence of each id, in order
    #[allow(clippy::type_complexity)]
    fn select_extensions(
        &self,
    ) -> Result<(Vec<&'a ExtensionDescriptor<P::Activation>>, Vec<DroppedExtension>)> {
        let mut first_seen: BTreeMap<&str, usize> = BTreeMap::new();
        let mut active = Vec::with_capacity(self.extensions.len());
        let mut dropped = Vec::new();

        for (position, descriptor) in self.extensions.iter().enumerate() {
            if descriptor.id.trim().is_empty() {
                return Err(GenError::EmptyExtensionId { position }.into());
            }
            match first_seen.get(descriptor.id.as_str()) {
                None => {
                    first_seen.insert(descriptor.id.as_str(), position);
                    active.push(descriptor);
                }
                Some(&first) => match self.config.duplicate_extension_ids {
                    DuplicateIdPolicy::Reject => {
                        return Err(GenError::DuplicateExtensionId {
                            extension_id: descriptor.id.clone(),
                            first,
                            duplicate: position,
                        }
                        .into());
                    }
                    DuplicateIdPolicy::Skip => {
                        tracing::warn!(
                            run_id = self.run_id.as_str(),
                            extension_id = descriptor.id.as_str(),
                            first,
                            position,
                            "duplicate extension id; later descriptor not evaluated"
                        );
                        dropped.push(DroppedExtension {
                            extension_id: descriptor.id.clone(),
                            position,
                        });
                    }
                },
            }
        }
        Ok((active, dropped))
    }

    fn snapshot_base(&self) -> Result<EntitySnapshot> {
        let start = Instant::now();
        log_op_start!("snapshot_base", run_id = self.run_id.as_str());

        match self.provider.snapshot(&[]) {
            Ok(snapshot) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                log_op_end!(
                    "snapshot_base",
                    duration_ms = duration_ms,
                    run_id = self.run_id.as_str(),
                    entity_count = snapshot.len()
                );
                Ok(snapshot)
            }
            Err(e) => {
                let err = GenError::BaseSnapshotFailed {
                    message: e.to_string(),
                };
                let duration_ms = start.elapsed().as_millis() as u64;
                log_op_error!("snapshot_base", err.clone(), duration_ms = duration_ms);
                Err(err.into())
            }
        }
    }

    fn snapshot_extension(
        &self,
        descriptor: &ExtensionDescriptor<P::Activation>,
    ) -> Result<EntitySnapshot> {
        let start = Instant::now();
        log_op_start!(
            "snapshot_extension",
            run_id = self.run_id.as_str(),
            extension_id = descriptor.id.as_str()
        );

        match self.provider.snapshot(std::slice::from_ref(descriptor)) {
            Ok(snapshot) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                log_op_end!(
                    "snapshot_extension",
                    duration_ms = duration_ms,
                    run_id = self.run_id.as_str(),
                    extension_id = descriptor.id.as_str(),
                    entity_count = snapshot.len()
                );
                Ok(snapshot)
            }
            Err(e) => {
                let err = GenError::ExtensionSnapshotFailed {
                    extension_id: descriptor.id.clone(),
                    message: e.to_string(),
                };
                let duration_ms = start.elapsed().as_millis() as u64;
                log_op_error!("snapshot_extension", err.clone(), duration_ms = duration_ms);
                Err(err.into())
            }
        }
    }
}

/// Build and execute a run in one call.
///
/// # Errors
///
/// As [`GenerationRun::execute`].
pub fn generate_types<P: SnapshotProvider>(
    provider: &P,
    extensions: &[ExtensionDescriptor<P::Activation>],
    config: &GeneratorConfig,
) -> Result<GeneratedArtifact> {
    GenerationRun::new(provider, extensions, config).execute()
}

/// Generate twice and check that both artifacts are byte-identical.
///
/// # Errors
///
/// `DeterminismViolation` when the digests differ, otherwise as
/// [`GenerationRun::execute`].
pub fn verify_reproducible<P: SnapshotProvider>(
    provider: &P,
    extensions: &[ExtensionDescriptor<P::Activation>],
    config: &GeneratorConfig,
) -> Result<GeneratedArtifact> {
    let first = generate_types(provider, extensions, config)?;
    let second = generate_types(provider, extensions, config)?;
    if first.digest != second.digest {
        return Err(ExError::from(GenError::NonReproducibleOutput {
            first: first.digest,
            second: second.digest,
        })
        .with_op("verify_reproducible")
        .with_run_id(second.report.run_id));
    }
    Ok(first)
}
