//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production pipelines (e.g. CI regeneration jobs)
    Production,
    /// In-memory capture for assertions, see `init_test_capture()`
    Test,
}

impl Profile {
    /// Default filter directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> &'static str {
        match self {
            Profile::Development => "schemagen=debug",
            Profile::Production => "schemagen=info",
            // test binaries log under their own crate names
            Profile::Test => "trace",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at startup. Later calls are no-ops, whatever profile they pass,
/// and so is the first call when another subscriber is already installed.
///
/// # Profiles
///
/// - **Development**: Human-readable logs with debug level
/// - **Production**: JSON structured logs with info level
/// - **Test**: Installs the capture layer; `init_test_capture()` returns
///   its handle
///
/// # Example
///
/// ```
/// use schemagen_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()));
        match profile {
            Profile::Development => {
                let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
            }
            Profile::Production => {
                let _ = tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .try_init();
            }
            Profile::Test => {
                super::test_capture::init_test_capture();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Development);
    }

    #[test]
    fn test_default_directives_differ_by_profile() {
        assert_eq!(Profile::Development.default_directive(), "schemagen=debug");
        assert_eq!(Profile::Production.default_directive(), "schemagen=info");
        assert_eq!(Profile::Test.default_directive(), "trace");
        assert_ne!(
            Profile::Development.default_directive(),
            Profile::Production.default_directive()
        );
    }
}
