//! Per-extension delta computation.
//!
//! An extension is only ever observed alone: its snapshot is the schema with
//! that single extension active, and its delta is what that snapshot adds on
//! top of the base. Effects that only appear when two extensions are active
//! together are invisible here.

use crate::delta::model::{ExtensionDelta, FieldRedefinition};
use crate::model::{EntityFields, EntitySnapshot};
use std::collections::BTreeSet;

/// Key set of an entity's base fields, empty when the entity is absent
fn base_keys<'a>(base: &'a EntitySnapshot, entity: &str) -> BTreeSet<&'a str> {
    base.entity(entity)
        .map(|fields| fields.keys().collect())
        .unwrap_or_default()
}

/// Fields `with_extension` reports that the base does not have, per entity.
///
/// Presence is decided by key membership only: a key the base already has is
/// never part of the delta, even when the extension redefines its attributes.
/// Entities contributing nothing are omitted. Field order follows
/// `with_extension`.
pub fn compute_delta(base: &EntitySnapshot, with_extension: &EntitySnapshot) -> ExtensionDelta {
    let mut delta = ExtensionDelta::new();
    for (entity, fields) in with_extension.entities() {
        let known = base_keys(base, entity);
        let added: EntityFields = fields
            .iter()
            .filter(|(key, _)| !known.contains(key))
            .map(|(key, attr)| (key.to_string(), attr.clone()))
            .collect();
        delta.push(entity, added);
    }
    delta
}

/// Base fields whose attributes differ in `with_extension`.
pub fn find_redefinitions(
    base: &EntitySnapshot,
    with_extension: &EntitySnapshot,
    extension_id: &str,
) -> Vec<FieldRedefinition> {
    let mut found = Vec::new();
    for (entity, fields) in with_extension.entities() {
        let Some(base_fields) = base.entity(entity) else {
            continue;
        };
        for (key, attr) in fields.iter() {
            if let Some(base_attr) = base_fields.get(key) {
                if base_attr != attr {
                    found.push(FieldRedefinition {
                        extension_id: extension_id.to_string(),
                        entity: entity.to_string(),
                        field: key.to_string(),
                        base: base_attr.clone(),
                        extension: attr.clone(),
                    });
                }
            }
        }
    }
    found
}
