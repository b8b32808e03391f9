//! The snapshot provider seam.

use schemagen_core::model::{EntitySnapshot, ExtensionDescriptor};
use thiserror::Error;

/// Failure reported by a snapshot provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Resolves the entity schema for a set of active extensions.
///
/// The generator treats providers as black boxes. It only ever asks for the
/// base (an empty slice) or for exactly one active extension, and it waits
/// for each answer before asking the next question.
pub trait SnapshotProvider {
    /// Opaque activation payload carried by each descriptor
    type Activation;

    /// Schema with exactly the given extensions active.
    ///
    /// # Errors
    ///
    /// Any failure to resolve the schema. The generator treats it as fatal.
    fn snapshot(
        &self,
        active: &[ExtensionDescriptor<Self::Activation>],
    ) -> Result<EntitySnapshot, ProviderError>;
}

impl<P: SnapshotProvider + ?Sized> SnapshotProvider for &P {
    type Activation = P::Activation;

    fn snapshot(
        &self,
        active: &[ExtensionDescriptor<Self::Activation>],
    ) -> Result<EntitySnapshot, ProviderError> {
        (**self).snapshot(active)
    }
}
