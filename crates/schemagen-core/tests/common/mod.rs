use schemagen_core::model::{EntityFields, EntitySnapshot, FieldAttribute};

/// Base schema with `user { email! }`
#[allow(dead_code)]
pub fn user_base() -> EntitySnapshot {
    EntitySnapshot::new().with_entity(
        "user",
        EntityFields::new().with_field("email", FieldAttribute::string().required()),
    )
}

/// `base` with extra fields appended to one entity, creating it if absent.
///
/// Mirrors what a snapshot provider reports when a single extension is
/// active.
#[allow(dead_code)]
pub fn with_fields(
    base: &EntitySnapshot,
    entity: &str,
    fields: &[(&str, FieldAttribute)],
) -> EntitySnapshot {
    let mut snapshot = base.clone();
    if !snapshot.contains_entity(entity) {
        snapshot.insert_entity(entity, EntityFields::new());
    }
    if let Some(table) = snapshot.entity_mut(entity) {
        for (key, attr) in fields {
            table.insert(*key, attr.clone());
        }
    }
    snapshot
}

/// The `admin` extension: `user.banned?: boolean`
#[allow(dead_code)]
pub fn admin_snapshot() -> EntitySnapshot {
    with_fields(&user_base(), "user", &[("banned", FieldAttribute::boolean())])
}

/// The `username` extension: `user.username?: string`
#[allow(dead_code)]
pub fn username_snapshot() -> EntitySnapshot {
    with_fields(&user_base(), "user", &[("username", FieldAttribute::string())])
}

/// The `jwt` extension: a new `jwks` entity
#[allow(dead_code)]
pub fn jwt_snapshot() -> EntitySnapshot {
    with_fields(
        &user_base(),
        "jwks",
        &[
            ("publicKey", FieldAttribute::string().required()),
            ("expiresAt", FieldAttribute::date()),
        ],
    )
}

#[allow(dead_code)]
pub fn ext(id: &str, snapshot: EntitySnapshot) -> (String, EntitySnapshot) {
    (id.to_string(), snapshot)
}
