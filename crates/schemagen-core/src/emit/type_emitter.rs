//! TypeScript declaration emitter.
//!
//! Emission dispatches on the [`EntityShape`] computed during aggregation:
//!
//! | Shape | Declarations |
//! |---|---|
//! | `BaseOnly` | `{Name}BaseFields`, `{Name} = {Name}BaseFields` |
//! | `ExtensionOnly` | `{Name}Fields`, `{Name} = {Name}Fields` |
//! | `Merged` | `{Name}BaseFields` (if base), `{Name}PluginFields`, `{Name} = A & B["id"] & ...` |
//!
//! followed by the extension-id union, the master model map and the
//! model-name union.
//!
//! Within one field table every on-wire name appears once. A later key that
//! maps to an already emitted wire name is left out and reported as a
//! [`WireNameCollision`].

use crate::config::NamingConfig;
use crate::delta::{AggregatedModel, EntityShape, PlannedEntity};
use crate::emit::naming::{is_identifier, property_key, string_literal, TypeNamer};
use crate::model::{EntityFields, EntitySnapshot, FieldType};
use crate::{log_op_end, log_op_start};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// What a declaration describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    BaseFields,
    PluginFields,
    /// Flat field record of an entity that exists through one extension only
    Fields,
    /// The merged entity type consumers use
    Entity,
    ExtensionIdUnion,
    ModelMap,
    ModelNameUnion,
}

/// One emitted `export type` declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    /// Declared type name
    pub name: String,
    /// Wire name of the entity this declaration belongs to, if any
    pub entity: Option<String>,
    pub text: String,
}

/// Two keys of one field table that share an on-wire name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireNameCollision {
    pub entity: String,
    /// Extension whose delta holds both keys, `None` for the base table
    pub extension_id: Option<String>,
    pub wire_name: String,
    /// Key whose member was emitted
    pub kept_key: String,
    /// Key whose member was left out
    pub dropped_key: String,
}

/// Everything the emitter produced for one run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EmittedTypes {
    pub declarations: Vec<Declaration>,
    /// `(wire name, merged type name)` in emission order
    pub entity_types: Vec<(String, String)>,
    /// Emitted members typed `unknown`
    pub unknown_field_count: usize,
    pub wire_name_collisions: Vec<WireNameCollision>,
}

impl EmittedTypes {
    /// Declaration of the given kind for an entity
    pub fn find(&self, entity: &str, kind: DeclarationKind) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.kind == kind && d.entity.as_deref() == Some(entity))
    }

    /// Declaration of a cross-cutting kind (unions, model map)
    pub fn find_global(&self, kind: DeclarationKind) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.kind == kind && d.entity.is_none())
    }
}

struct Emitter<'a> {
    base: &'a EntitySnapshot,
    model: &'a AggregatedModel,
    naming: &'a NamingConfig,
    out: EmittedTypes,
}

/// Emit every declaration for an aggregated model.
pub fn emit_types(
    base: &EntitySnapshot,
    model: &AggregatedModel,
    naming: &NamingConfig,
) -> EmittedTypes {
    let start = Instant::now();
    log_op_start!("emit_types", entity_count = model.entities.len());

    let mut namer = TypeNamer::new();
    namer.reserve(&naming.extension_union);
    namer.reserve(&naming.model_map);
    namer.reserve(&naming.model_name_union);
    // built-in target types such as `Date` must stay unshadowed
    for field_type in FieldType::ALL {
        let target = field_type.target_type();
        if is_identifier(target) {
            namer.reserve(target);
        }
    }
    let suffixes = [
        naming.base_fields_suffix.as_str(),
        naming.plugin_fields_suffix.as_str(),
        naming.fields_suffix.as_str(),
    ];

    let mut emitter = Emitter {
        base,
        model,
        naming,
        out: EmittedTypes::default(),
    };
    for planned in &model.entities {
        let type_name = namer.claim(&planned.name, &suffixes);
        emitter.emit_entity(planned, &type_name);
    }
    emitter.emit_extension_union();
    emitter.emit_model_map();
    emitter.emit_model_name_union();

    let out = emitter.out;
    let duration_ms = start.elapsed().as_millis() as u64;
    log_op_end!(
        "emit_types",
        duration_ms = duration_ms,
        declaration_count = out.declarations.len(),
        unknown_field_count = out.unknown_field_count,
        wire_name_collision_count = out.wire_name_collisions.len()
    );
    out
}

impl Emitter<'_> {
    fn push(&mut self, kind: DeclarationKind, name: String, entity: Option<&str>, body: String) {
        let text = format!("export type {} = {};", name, body);
        self.out.declarations.push(Declaration {
            kind,
            name,
            entity: entity.map(str::to_string),
            text,
        });
    }

    fn emit_entity(&mut self, planned: &PlannedEntity, type_name: &str) {
        let entity = planned.name.as_str();
        let base_name = format!("{}{}", type_name, self.naming.base_fields_suffix);
        let plugin_name = format!("{}{}", type_name, self.naming.plugin_fields_suffix);

        let merged = match &planned.shape {
            EntityShape::BaseOnly => {
                self.emit_base_fields(entity, &base_name);
                base_name
            }
            EntityShape::ExtensionOnly { extension_id } => {
                let fields_name = format!("{}{}", type_name, self.naming.fields_suffix);
                let model = self.model;
                let record = match model.deltas.get(entity, extension_id) {
                    Some(fields) => self.record(entity, Some(extension_id), fields, 0),
                    None => "{}".to_string(),
                };
                self.push(
                    DeclarationKind::Fields,
                    fields_name.clone(),
                    Some(entity),
                    record,
                );
                fields_name
            }
            EntityShape::Merged {
                has_base,
                extension_ids,
            } => {
                let mut parts: Vec<String> = Vec::new();
                if *has_base {
                    self.emit_base_fields(entity, &base_name);
                    parts.push(base_name);
                }
                if !extension_ids.is_empty() {
                    self.emit_plugin_fields(entity, &plugin_name, extension_ids);
                    parts.extend(
                        extension_ids
                            .iter()
                            .map(|id| format!("{}[{}]", plugin_name, string_literal(id))),
                    );
                }
                if parts.is_empty() {
                    "{}".to_string()
                } else {
                    parts.join(" & ")
                }
            }
        };

        self.push(
            DeclarationKind::Entity,
            type_name.to_string(),
            Some(entity),
            merged,
        );
        self.out
            .entity_types
            .push((entity.to_string(), type_name.to_string()));
    }

    fn emit_base_fields(&mut self, entity: &str, name: &str) {
        let base = self.base;
        let record = match base.entity(entity) {
            Some(fields) => self.record(entity, None, fields, 0),
            None => "{}".to_string(),
        };
        self.push(
            DeclarationKind::BaseFields,
            name.to_string(),
            Some(entity),
            record,
        );
    }

    fn emit_plugin_fields(&mut self, entity: &str, name: &str, extension_ids: &[String]) {
        let model = self.model;
        let mut body = String::from("{\n");
        for id in extension_ids {
            let record = match model.deltas.get(entity, id) {
                Some(fields) => self.record(entity, Some(id), fields, 1),
                None => "{}".to_string(),
            };
            body.push_str(&format!("  {}: {};\n", string_literal(id), record));
        }
        body.push('}');
        self.push(
            DeclarationKind::PluginFields,
            name.to_string(),
            Some(entity),
            body,
        );
    }

    /// Object type literal for a field table, indented for nesting `depth`
    fn record(
        &mut self,
        entity: &str,
        extension_id: Option<&str>,
        fields: &EntityFields,
        depth: usize,
    ) -> String {
        if fields.is_empty() {
            return "{}".to_string();
        }
        let pad = "  ".repeat(depth + 1);
        let mut body = String::from("{\n");
        let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();
        for (key, attr) in fields.iter() {
            let wire_name = attr.wire_name(key);
            if let Some(&kept_key) = claimed.get(wire_name) {
                tracing::warn!(
                    entity,
                    extension_id,
                    wire_name,
                    kept_key,
                    dropped_key = key,
                    "on-wire name already emitted in this table; member left out"
                );
                self.out.wire_name_collisions.push(WireNameCollision {
                    entity: entity.to_string(),
                    extension_id: extension_id.map(str::to_string),
                    wire_name: wire_name.to_string(),
                    kept_key: kept_key.to_string(),
                    dropped_key: key.to_string(),
                });
                continue;
            }
            claimed.insert(wire_name, key);
            if attr.field_type == FieldType::Unknown {
                self.out.unknown_field_count += 1;
            }
            body.push_str(&format!(
                "{}{}{}: {};\n",
                pad,
                property_key(wire_name),
                if attr.required { "" } else { "?" },
                attr.field_type.target_type()
            ));
        }
        body.push_str(&"  ".repeat(depth));
        body.push('}');
        body
    }

    fn emit_extension_union(&mut self) {
        let body = if self.model.extension_ids.is_empty() {
            "never".to_string()
        } else {
            self.model
                .extension_ids
                .iter()
                .map(|id| string_literal(id))
                .collect::<Vec<_>>()
                .join(" | ")
        };
        let name = self.naming.extension_union.clone();
        self.push(DeclarationKind::ExtensionIdUnion, name, None, body);
    }

    fn emit_model_map(&mut self) {
        let body = if self.out.entity_types.is_empty() {
            "{}".to_string()
        } else {
            let mut body = String::from("{\n");
            for (wire, type_name) in &self.out.entity_types {
                body.push_str(&format!("  {}: {};\n", string_literal(wire), type_name));
            }
            body.push('}');
            body
        };
        let name = self.naming.model_map.clone();
        self.push(DeclarationKind::ModelMap, name, None, body);
    }

    fn emit_model_name_union(&mut self) {
        let body = format!("keyof {}", self.naming.model_map);
        let name = self.naming.model_name_union.clone();
        self.push(DeclarationKind::ModelNameUnion, name, None, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::aggregate;
    use crate::model::{EntityFields, FieldAttribute};

    #[test]
    fn test_base_only_entity_aliases_base_fields() {
        let base = EntitySnapshot::new().with_entity(
            "user",
            EntityFields::new()
                .with_field("email", FieldAttribute::string().required())
                .with_field("name", FieldAttribute::string()),
        );
        let model = aggregate(&base, &[]);
        let out = emit_types(&base, &model, &NamingConfig::default());

        let fields = out.find("user", DeclarationKind::BaseFields).unwrap();
        assert_eq!(
            fields.text,
            "export type UserBaseFields = {\n  email: string;\n  name?: string;\n};"
        );
        let entity = out.find("user", DeclarationKind::Entity).unwrap();
        assert_eq!(entity.text, "export type User = UserBaseFields;");
        assert!(out.find("user", DeclarationKind::PluginFields).is_none());
    }

    #[test]
    fn test_field_name_override_and_quoting() {
        let base = EntitySnapshot::new().with_entity(
            "audit-log",
            EntityFields::new()
                .with_field("createdAt", FieldAttribute::date().with_field_name("created-at"))
                .with_field("tags", FieldAttribute::string_list()),
        );
        let model = aggregate(&base, &[]);
        let out = emit_types(&base, &model, &NamingConfig::default());

        let fields = out.find("audit-log", DeclarationKind::BaseFields).unwrap();
        assert_eq!(
            fields.text,
            "export type AuditLogBaseFields = {\n  \"created-at\"?: Date;\n  tags?: string[];\n};"
        );
    }

    #[test]
    fn test_unknown_fields_are_counted() {
        let base = EntitySnapshot::new().with_entity(
            "blob",
            EntityFields::new().with_field("payload", FieldAttribute::new(FieldType::Unknown)),
        );
        let model = aggregate(&base, &[]);
        let out = emit_types(&base, &model, &NamingConfig::default());
        assert_eq!(out.unknown_field_count, 1);
        assert!(out
            .find("blob", DeclarationKind::BaseFields)
            .unwrap()
            .text
            .contains("payload?: unknown;"));
    }

    #[test]
    fn test_empty_model_emits_never_and_empty_map() {
        let base = EntitySnapshot::new();
        let model = aggregate(&base, &[]);
        let out = emit_types(&base, &model, &NamingConfig::default());

        let texts: Vec<&str> = out.declarations.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "export type PluginId = never;",
                "export type ModelTypeMap = {};",
                "export type ModelName = keyof ModelTypeMap;",
            ]
        );
    }

    #[test]
    fn test_empty_merged_shape_emits_empty_type() {
        let base = EntitySnapshot::new();
        let model = AggregatedModel {
            entities: vec![PlannedEntity {
                name: "ghost".to_string(),
                shape: EntityShape::Merged {
                    has_base: false,
                    extension_ids: vec![],
                },
            }],
            ..AggregatedModel::default()
        };
        let out = emit_types(&base, &model, &NamingConfig::default());
        let entity = out.find("ghost", DeclarationKind::Entity).unwrap();
        assert_eq!(entity.text, "export type Ghost = {};");
    }
}
