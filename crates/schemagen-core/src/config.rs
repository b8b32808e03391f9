//! Generator configuration.
//!
//! Loaded from TOML; every field has a default so an empty document is a
//! valid configuration:
//!
//! ```toml
//! header = ["This file is generated. Do not edit."]
//! duplicate_extension_ids = "skip"   # or "reject"
//!
//! [naming]
//! base_fields_suffix = "BaseFields"
//! plugin_fields_suffix = "PluginFields"
//! fields_suffix = "Fields"
//! extension_union = "PluginId"
//! model_map = "ModelTypeMap"
//! model_name_union = "ModelName"
//! ```

use crate::emit::naming::is_identifier;
use crate::errors::{GenError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when two extension descriptors share an id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateIdPolicy {
    /// Keep the first descriptor, drop later ones and report them
    #[default]
    Skip,
    /// Fail the run
    Reject,
}

/// Names of the emitted helper types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    pub base_fields_suffix: String,
    pub plugin_fields_suffix: String,
    pub fields_suffix: String,
    pub extension_union: String,
    pub model_map: String,
    pub model_name_union: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            base_fields_suffix: "BaseFields".to_string(),
            plugin_fields_suffix: "PluginFields".to_string(),
            fields_suffix: "Fields".to_string(),
            extension_union: "PluginId".to_string(),
            model_map: "ModelTypeMap".to_string(),
            model_name_union: "ModelName".to_string(),
        }
    }
}

impl NamingConfig {
    fn validate(&self) -> Result<()> {
        for (field, suffix) in [
            ("base_fields_suffix", &self.base_fields_suffix),
            ("plugin_fields_suffix", &self.plugin_fields_suffix),
            ("fields_suffix", &self.fields_suffix),
        ] {
            // a suffix must be able to follow an identifier
            if suffix.is_empty() || !is_identifier(&format!("A{}", suffix)) {
                return Err(invalid(format!(
                    "naming.{} must be a non-empty identifier suffix, got {:?}",
                    field, suffix
                )));
            }
        }
        if self.base_fields_suffix == self.plugin_fields_suffix {
            return Err(invalid(
                "naming.base_fields_suffix and naming.plugin_fields_suffix must differ",
            ));
        }

        let names = [
            ("extension_union", &self.extension_union),
            ("model_map", &self.model_map),
            ("model_name_union", &self.model_name_union),
        ];
        for (field, name) in names {
            if !is_identifier(name) {
                return Err(invalid(format!(
                    "naming.{} must be a valid identifier, got {:?}",
                    field, name
                )));
            }
        }
        if names[0].1 == names[1].1 || names[0].1 == names[2].1 || names[1].1 == names[2].1 {
            return Err(invalid(
                "naming.extension_union, naming.model_map and naming.model_name_union must be distinct",
            ));
        }
        Ok(())
    }
}

/// Configuration of one generator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Lines of the generated-file header, each emitted as a `//` comment
    pub header: Vec<String>,
    pub duplicate_extension_ids: DuplicateIdPolicy,
    pub naming: NamingConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            header: vec![
                "This file is generated by schemagen. Do not edit by hand.".to_string(),
                "Every run recomputes and overwrites the full contents.".to_string(),
            ],
            duplicate_extension_ids: DuplicateIdPolicy::Skip,
            naming: NamingConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse and validate a TOML document.
    ///
    /// ## Errors
    ///
    /// `GenError::InvalidConfig` when the document does not parse or fails
    /// validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GeneratorConfig = toml::from_str(text).map_err(|e| GenError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// ## Errors
    ///
    /// `GenError::Io` when the file cannot be read, otherwise as
    /// [`GeneratorConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GenError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loading generator configuration");
        Self::from_toml_str(&text)
    }

    /// Check header lines and type names.
    ///
    /// ## Errors
    ///
    /// `GenError::InvalidConfig` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        if let Some(line) = self.header.iter().find(|l| l.contains(['\n', '\r'])) {
            return Err(invalid(format!(
                "header lines must not contain line breaks, got {:?}",
                line
            )));
        }
        self.naming.validate()
    }
}

fn invalid(reason: impl Into<String>) -> GenError {
    GenError::InvalidConfig {
        reason: reason.into(),
    }
}
