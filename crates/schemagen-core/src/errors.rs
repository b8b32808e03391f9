use schemagen_core_types::RunId;
use thiserror::Error;

/// Result type alias using GenError
pub type Result<T> = std::result::Result<T, GenError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Stable classification of every error the generator can surface. Each kind
/// maps to a stable `ERR_*` code usable for programmatic handling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input/Validation
    InvalidInput,
    InvalidConfig,
    FixtureInvalid,

    // Run lifecycle
    /// A generation run was executed outside the `Idle` state
    InvalidState,

    // Snapshot collaborator
    /// The snapshot provider failed for the base or for one extension
    SnapshotFailure,
    /// Two extension descriptors share an id and the policy rejects duplicates
    DuplicateExtensionId,

    // Output
    DeterminismViolation,

    // Integration/IO
    Io,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::FixtureInvalid => "ERR_FIXTURE_INVALID",
            ExErrorKind::InvalidState => "ERR_INVALID_STATE",
            ExErrorKind::SnapshotFailure => "ERR_SNAPSHOT_FAILURE",
            ExErrorKind::DuplicateExtensionId => "ERR_DUPLICATE_EXTENSION_ID",
            ExErrorKind::DeterminismViolation => "ERR_DETERMINISM_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and the run
/// context (extension id, run id) needed to report a failure.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    extension_id: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            extension_id: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Set the operation name
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Set the extension id the error relates to
    pub fn with_extension_id(mut self, id: impl Into<String>) -> Self {
        self.extension_id = Some(id.into());
        self
    }

    /// Attach the generation run id
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Set the human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Chain an underlying error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn extension_id(&self) -> Option<&str> {
        self.extension_id.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(extension_id) = &self.extension_id {
            write!(f, " (extension_id: {})", extension_id)?;
        }
        if let Some(run_id) = &self.run_id {
            write!(f, " (run_id: {})", run_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the generator kernel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenError {
    /// The snapshot provider failed while resolving the base schema
    #[error("Snapshot provider failed for the base schema: {message}")]
    BaseSnapshotFailed { message: String },

    /// The snapshot provider failed while resolving one extension
    #[error("Snapshot provider failed for extension '{extension_id}': {message}")]
    ExtensionSnapshotFailed {
        extension_id: String,
        message: String,
    },

    /// Two extension descriptors share an id (only raised under the reject policy)
    #[error("Duplicate extension id '{extension_id}' at positions {first} and {duplicate}")]
    DuplicateExtensionId {
        extension_id: String,
        first: usize,
        duplicate: usize,
    },

    /// An extension id is empty or whitespace-only
    #[error("Extension at position {position} has an empty id")]
    EmptyExtensionId { position: usize },

    /// Configuration failed to parse or validate
    #[error("Invalid generator configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Fixture document failed to parse or validate
    #[error("Invalid snapshot fixture: {reason}")]
    InvalidFixture { reason: String },

    /// A run was executed from a state other than Idle
    #[error("Generation run cannot execute from state {state}")]
    InvalidRunState { state: String },

    /// Filesystem access failed
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Two runs over identical input produced different artifacts
    #[error("Generated output is not reproducible: digest {first} != {second}")]
    NonReproducibleOutput { first: String, second: String },
}

/// Conversion from GenError to the canonical ExError
impl From<GenError> for ExError {
    fn from(err: GenError) -> Self {
        let message = err.to_string();
        match err {
            GenError::BaseSnapshotFailed { .. } => ExError::new(ExErrorKind::SnapshotFailure)
                .with_op("snapshot_base")
                .with_message(message),

            GenError::ExtensionSnapshotFailed { extension_id, .. } => {
                ExError::new(ExErrorKind::SnapshotFailure)
                    .with_op("snapshot_extension")
                    .with_extension_id(extension_id)
                    .with_message(message)
            }

            GenError::DuplicateExtensionId { extension_id, .. } => {
                ExError::new(ExErrorKind::DuplicateExtensionId)
                    .with_extension_id(extension_id)
                    .with_message(message)
            }

            GenError::EmptyExtensionId { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            GenError::InvalidConfig { .. } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }

            GenError::InvalidFixture { .. } => {
                ExError::new(ExErrorKind::FixtureInvalid).with_message(message)
            }

            GenError::InvalidRunState { .. } => {
                ExError::new(ExErrorKind::InvalidState).with_message(message)
            }

            GenError::Io { .. } => ExError::new(ExErrorKind::Io).with_message(message),

            GenError::NonReproducibleOutput { .. } => {
                ExError::new(ExErrorKind::DeterminismViolation).with_message(message)
            }
        }
    }
}
