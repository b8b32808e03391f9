//! Field vocabulary: scalar kinds, their target types, and field attributes.

use serde::{Deserialize, Serialize};

/// Closed set of scalar kinds a schema field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Boolean,
    Date,
    Number,
    String,
    NumberList,
    StringList,
    Unknown,
}

impl FieldType {
    /// Every kind, in declaration order
    pub const ALL: [FieldType; 7] = [
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Number,
        FieldType::String,
        FieldType::NumberList,
        FieldType::StringList,
        FieldType::Unknown,
    ];

    /// Target (TypeScript) type for this kind.
    ///
    /// A new kind does not compile until it has a target here.
    pub const fn target_type(self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Date => "Date",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::NumberList => "number[]",
            FieldType::StringList => "string[]",
            FieldType::Unknown => "unknown",
        }
    }

    /// Canonical source spelling, as providers report it
    pub const fn source_kind(self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::NumberList => "number[]",
            FieldType::StringList => "string[]",
            FieldType::Unknown => "unknown",
        }
    }

    /// Parse a source kind, returning `None` when it has no mapping.
    pub fn parse(kind: &str) -> Option<FieldType> {
        match kind.trim() {
            "boolean" => Some(FieldType::Boolean),
            "date" => Some(FieldType::Date),
            "number" => Some(FieldType::Number),
            "string" => Some(FieldType::String),
            "number[]" | "number-list" => Some(FieldType::NumberList),
            "string[]" | "string-list" => Some(FieldType::StringList),
            "unknown" => Some(FieldType::Unknown),
            _ => None,
        }
    }

    /// Parse a source kind, degrading unmapped kinds to `Unknown`.
    pub fn from_source_kind(kind: &str) -> FieldType {
        FieldType::parse(kind).unwrap_or_else(|| {
            tracing::warn!(
                source_kind = kind,
                "unmapped field type, falling back to unknown"
            );
            FieldType::Unknown
        })
    }
}

impl From<String> for FieldType {
    fn from(kind: String) -> Self {
        FieldType::from_source_kind(&kind)
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.source_kind().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.source_kind())
    }
}

/// Attributes of one schema field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAttribute {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// On-wire name override; the field key is used when absent
    #[serde(
        default,
        rename = "fieldName",
        alias = "field_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_name: Option<String>,
}

impl FieldAttribute {
    /// Optional field of the given type
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            field_name: None,
        }
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn date() -> Self {
        Self::new(FieldType::Date)
    }

    pub fn number() -> Self {
        Self::new(FieldType::Number)
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    pub fn number_list() -> Self {
        Self::new(FieldType::NumberList)
    }

    pub fn string_list() -> Self {
        Self::new(FieldType::StringList)
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the on-wire field name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    /// Name the field is exposed under: the override if set, else `key`
    pub fn wire_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.field_name.as_deref().unwrap_or(key)
    }
}
