//! Aggregation of every extension's delta into one emission plan.

use crate::delta::compute::{compute_delta, find_redefinitions};
use crate::delta::model::{
    AggregatedModel, DeltaMap, DroppedExtension, EntityShape, PlannedEntity,
};
use crate::model::EntitySnapshot;
use crate::{log_op_end, log_op_start};
use std::collections::BTreeSet;
use std::time::Instant;

/// Aggregate isolated extension snapshots against the shared base.
///
/// Extensions are processed in the given order. The first occurrence of an
/// id wins; later descriptors with the same id are dropped and their fields
/// never reach the output (they are logged and listed in
/// `dropped_duplicates`).
///
/// Entity order: base entities in base order, then entities first introduced
/// by an extension, in extension order. Entities with no base field and no
/// delta are not planned.
pub fn aggregate(
    base: &EntitySnapshot,
    extensions: &[(String, EntitySnapshot)],
) -> AggregatedModel {
    let start = Instant::now();
    log_op_start!("aggregate", extension_count = extensions.len());

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut extension_ids: Vec<String> = Vec::new();
    let mut dropped_duplicates: Vec<DroppedExtension> = Vec::new();
    let mut redefinitions = Vec::new();
    let mut deltas = DeltaMap::new();

    for (position, (id, snapshot)) in extensions.iter().enumerate() {
        if !seen.insert(id.as_str()) {
            tracing::warn!(
                extension_id = id.as_str(),
                position,
                "duplicate extension id; later descriptor dropped"
            );
            dropped_duplicates.push(DroppedExtension {
                extension_id: id.clone(),
                position,
            });
            continue;
        }
        extension_ids.push(id.clone());

        let delta = compute_delta(base, snapshot);
        deltas.merge(id, &delta);

        for redefinition in find_redefinitions(base, snapshot, id) {
            tracing::debug!(
                extension_id = id.as_str(),
                entity = redefinition.entity.as_str(),
                field = redefinition.field.as_str(),
                "extension redefines a base field; base definition kept"
            );
            redefinitions.push(redefinition);
        }
    }

    let entities = plan_entities(base, &deltas);

    let duration_ms = start.elapsed().as_millis() as u64;
    log_op_end!(
        "aggregate",
        duration_ms = duration_ms,
        entity_count = entities.len(),
        dropped_count = dropped_duplicates.len()
    );

    AggregatedModel {
        deltas,
        entities,
        extension_ids,
        dropped_duplicates,
        redefinitions,
    }
}

/// Order and classify every entity that has something to emit
fn plan_entities(base: &EntitySnapshot, deltas: &DeltaMap) -> Vec<PlannedEntity> {
    let mut names: Vec<&str> = Vec::new();
    let mut listed: BTreeSet<&str> = BTreeSet::new();
    for name in base.entity_names().chain(deltas.entity_names()) {
        if listed.insert(name) {
            names.push(name);
        }
    }

    names
        .into_iter()
        .filter_map(|name| {
            let has_base = base.field_count(name) > 0;
            let extension_ids = deltas.extension_ids(name);
            if !has_base && extension_ids.is_empty() {
                return None;
            }
            Some(PlannedEntity {
                name: name.to_string(),
                shape: EntityShape::classify(has_base, extension_ids),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityFields, FieldAttribute};

    fn user_base() -> EntitySnapshot {
        EntitySnapshot::new()
            .with_entity(
                "user",
                EntityFields::new().with_field("email", FieldAttribute::string().required()),
            )
            .with_entity("empty", EntityFields::new())
    }

    fn with_user_field(key: &str) -> EntitySnapshot {
        let mut snapshot = user_base();
        if let Some(user) = snapshot.entity_mut("user") {
            user.insert(key, FieldAttribute::string());
        }
        snapshot
    }

    #[test]
    fn test_empty_base_entity_is_not_planned() {
        let model = aggregate(&user_base(), &[]);
        assert_eq!(model.entity_names(), vec!["user"]);
        assert_eq!(model.entities[0].shape, EntityShape::BaseOnly);
    }

    #[test]
    fn test_empty_base_entity_with_extension_fields_keeps_base_position() {
        let mut snapshot = user_base();
        snapshot.insert_entity(
            "empty",
            EntityFields::new().with_field("note", FieldAttribute::string()),
        );
        let model = aggregate(&user_base(), &[("notes".to_string(), snapshot)]);

        assert_eq!(model.entity_names(), vec!["user", "empty"]);
        assert_eq!(
            model.planned("empty").map(|p| &p.shape),
            Some(&EntityShape::ExtensionOnly {
                extension_id: "notes".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let model = aggregate(
            &user_base(),
            &[
                ("admin".to_string(), with_user_field("banned")),
                ("admin".to_string(), with_user_field("role")),
            ],
        );

        assert_eq!(model.extension_ids, vec!["admin".to_string()]);
        assert_eq!(
            model.dropped_duplicates,
            vec![DroppedExtension {
                extension_id: "admin".to_string(),
                position: 1
            }]
        );
        let fields = model.deltas.get("user", "admin").unwrap();
        assert!(fields.contains_key("banned"));
        assert!(!fields.contains_key("role"));
    }

    #[test]
    fn test_extension_without_contribution_is_still_listed() {
        let model = aggregate(&user_base(), &[("noop".to_string(), user_base())]);
        assert_eq!(model.extension_ids, vec!["noop".to_string()]);
        assert!(model.deltas.is_empty());
    }
}
