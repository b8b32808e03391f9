#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{admin_snapshot, ext, jwt_snapshot, user_base, username_snapshot, with_fields};
use schemagen_core::delta::{aggregate, compute_delta, DroppedExtension, EntityShape};
use schemagen_core::model::{EntityFields, EntitySnapshot, FieldAttribute, FieldType};

#[test]
fn test_delta_excludes_base_keys() {
    let delta = compute_delta(&user_base(), &admin_snapshot());

    let user = delta.entity("user").unwrap();
    assert_eq!(user.keys().collect::<Vec<_>>(), vec!["banned"]);
    assert!(!user.contains_key("email"));
}

#[test]
fn test_delta_keeps_provider_field_order() {
    let snapshot = with_fields(
        &user_base(),
        "user",
        &[
            ("zeta", FieldAttribute::string()),
            ("alpha", FieldAttribute::string()),
            ("mid", FieldAttribute::number()),
        ],
    );

    let delta = compute_delta(&user_base(), &snapshot);
    let keys: Vec<_> = delta.entity("user").unwrap().keys().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_entities_without_new_fields_are_omitted() {
    let snapshot = user_base().with_entity("session", EntityFields::new());
    let delta = compute_delta(&user_base(), &snapshot);
    assert!(delta.is_empty());
}

#[test]
fn test_aggregate_orders_base_then_extension_entities() {
    let base = user_base().with_entity(
        "session",
        EntityFields::new().with_field("token", FieldAttribute::string().required()),
    );
    let org = with_fields(&base, "organization", &[("name", FieldAttribute::string())]);
    let jwt = with_fields(&base, "jwks", &[("publicKey", FieldAttribute::string())]);

    let model = aggregate(&base, &[ext("organization", org), ext("jwt", jwt)]);

    assert_eq!(
        model.entity_names(),
        vec!["user", "session", "organization", "jwks"]
    );
}

#[test]
fn test_aggregate_classifies_scenario_entities() {
    let model = aggregate(
        &user_base(),
        &[
            ext("admin", admin_snapshot()),
            ext("username", username_snapshot()),
            ext("jwt", jwt_snapshot()),
        ],
    );

    assert_eq!(
        model.planned("user").unwrap().shape,
        EntityShape::Merged {
            has_base: true,
            extension_ids: vec!["admin".to_string(), "username".to_string()],
        }
    );
    assert_eq!(
        model.planned("jwks").unwrap().shape,
        EntityShape::ExtensionOnly {
            extension_id: "jwt".to_string()
        }
    );
    assert_eq!(model.extension_ids, vec!["admin", "username", "jwt"]);
}

#[test]
fn test_duplicate_admin_keeps_first_contribution_only() {
    let second_admin = with_fields(&user_base(), "user", &[("role", FieldAttribute::string())]);

    let model = aggregate(
        &user_base(),
        &[ext("admin", admin_snapshot()), ext("admin", second_admin)],
    );

    assert_eq!(model.extension_ids, vec!["admin"]);
    assert_eq!(
        model.dropped_duplicates,
        vec![DroppedExtension {
            extension_id: "admin".to_string(),
            position: 1,
        }]
    );
    let admin = model.deltas.get("user", "admin").unwrap();
    assert!(admin.contains_key("banned"));
    assert!(!admin.contains_key("role"));
}

#[test]
fn test_redefinition_is_reported_and_base_wins() {
    let mut snapshot = user_base();
    snapshot
        .entity_mut("user")
        .unwrap()
        .insert("email", FieldAttribute::string());

    let model = aggregate(&user_base(), &[ext("relaxed-email", snapshot)]);

    assert!(model.deltas.is_empty());
    assert_eq!(model.redefinitions.len(), 1);
    let redefinition = &model.redefinitions[0];
    assert_eq!(redefinition.extension_id, "relaxed-email");
    assert_eq!(redefinition.entity, "user");
    assert_eq!(redefinition.field, "email");
    assert!(redefinition.base.required);
    assert!(!redefinition.extension.required);
    assert_eq!(model.planned("user").unwrap().shape, EntityShape::BaseOnly);
}

#[test]
fn test_same_key_from_two_extensions_stays_separate() {
    let base = EntitySnapshot::new().with_entity(
        "session",
        EntityFields::new().with_field("token", FieldAttribute::string().required()),
    );
    let a = with_fields(&base, "session", &[("foo", FieldAttribute::number())]);
    let b = with_fields(&base, "session", &[("foo", FieldAttribute::string())]);

    let model = aggregate(&base, &[ext("A", a), ext("B", b)]);

    let a_foo = model.deltas.get("session", "A").unwrap().get("foo").unwrap();
    let b_foo = model.deltas.get("session", "B").unwrap().get("foo").unwrap();
    assert_eq!(a_foo.field_type, FieldType::Number);
    assert_eq!(b_foo.field_type, FieldType::String);
}
