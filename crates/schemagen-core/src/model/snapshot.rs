//! Schema snapshots: ordered entity → field → attribute tables.
//!
//! Order is significant everywhere in this module. Field order within an
//! entity, and entity order within a snapshot, are whatever the snapshot
//! provider reported; emission follows the same order so that output is
//! reproducible run-to-run. Both types serialize as maps whose entries are
//! visited in document order, so YAML and JSON fixtures keep their order.

use crate::model::field::FieldAttribute;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Ordered field table of one entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityFields {
    fields: Vec<(String, FieldAttribute)>,
}

impl EntityFields {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builder form of [`EntityFields::insert`]
    pub fn with_field(mut self, key: impl Into<String>, attr: FieldAttribute) -> Self {
        self.insert(key, attr);
        self
    }

    /// Insert a field, replacing an existing entry in place.
    ///
    /// Returns the previous attribute when the key was already present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        attr: FieldAttribute,
    ) -> Option<FieldAttribute> {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, attr)),
            None => {
                self.fields.push((key, attr));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldAttribute> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, a)| a)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldAttribute)> {
        self.fields.iter().map(|(k, a)| (k.as_str(), a))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldAttribute)> for EntityFields {
    fn from_iter<I: IntoIterator<Item = (String, FieldAttribute)>>(iter: I) -> Self {
        let mut fields = EntityFields::new();
        for (key, attr) in iter {
            fields.insert(key, attr);
        }
        fields
    }
}

/// Entity name → field table, as produced by one snapshot call.
///
/// Never mutated once a provider has returned it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntitySnapshot {
    entities: Vec<(String, EntityFields)>,
}

impl EntitySnapshot {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Builder form of [`EntitySnapshot::insert_entity`]
    pub fn with_entity(mut self, name: impl Into<String>, fields: EntityFields) -> Self {
        self.insert_entity(name, fields);
        self
    }

    /// Insert an entity, replacing an existing entry in place
    pub fn insert_entity(&mut self, name: impl Into<String>, fields: EntityFields) {
        let name = name.into();
        match self.entities.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = fields,
            None => self.entities.push((name, fields)),
        }
    }

    /// Mutable access used while a provider assembles a snapshot
    pub fn entity_mut(&mut self, name: &str) -> Option<&mut EntityFields> {
        self.entities
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    pub fn entity(&self, name: &str) -> Option<&EntityFields> {
        self.entities
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    pub fn contains_entity(&self, name: &str) -> bool {
        self.entities.iter().any(|(n, _)| n == name)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&str, &EntityFields)> {
        self.entities.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields the entity has, zero when it is absent
    pub fn field_count(&self, name: &str) -> usize {
        self.entity(name).map_or(0, EntityFields::len)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// An independently-authored extension to the base model.
///
/// `activation` is opaque to the generator; only the snapshot provider
/// interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDescriptor<A = ()> {
    pub id: String,
    pub activation: A,
}

impl<A> ExtensionDescriptor<A> {
    pub fn new(id: impl Into<String>, activation: A) -> Self {
        Self {
            id: id.into(),
            activation,
        }
    }
}

impl ExtensionDescriptor<()> {
    /// Descriptor whose activation carries no payload
    pub fn named(id: impl Into<String>) -> Self {
        Self::new(id, ())
    }
}

// ---------------------------------------------------------------------------
// Order-preserving map serde
// ---------------------------------------------------------------------------

fn serialize_ordered<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

struct OrderedMapVisitor<V> {
    what: &'static str,
    marker: PhantomData<V>,
}

impl<'de, V> Visitor<'de> for OrderedMapVisitor<V>
where
    V: Deserialize<'de>,
{
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map of {}", self.what)
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let capacity = access.size_hint().unwrap_or(0).min(1024);
        let mut entries: Vec<(String, V)> = Vec::with_capacity(capacity);
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(serde::de::Error::custom(format!(
                    "duplicate {} key `{}`",
                    self.what, key
                )));
            }
            entries.push((key, value));
        }
        Ok(entries)
    }
}

impl Serialize for EntityFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_ordered(&self.fields, serializer)
    }
}

impl<'de> Deserialize<'de> for EntityFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = deserializer.deserialize_map(OrderedMapVisitor {
            what: "field",
            marker: PhantomData,
        })?;
        Ok(EntityFields { fields })
    }
}

impl Serialize for EntitySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_ordered(&self.entities, serializer)
    }
}

impl<'de> Deserialize<'de> for EntitySnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entities = deserializer.deserialize_map(OrderedMapVisitor {
            what: "entity",
            marker: PhantomData,
        })?;
        Ok(EntitySnapshot { entities })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::FieldType;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut fields = EntityFields::new()
            .with_field("id", FieldAttribute::string().required())
            .with_field("name", FieldAttribute::string());

        let previous = fields.insert("id", FieldAttribute::number());

        assert_eq!(previous, Some(FieldAttribute::string().required()));
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(fields.get("id").map(|a| a.field_type), Some(FieldType::Number));
    }

    #[test]
    fn test_json_preserves_document_order() {
        let json = r#"{
            "user": {"zeta": {"type": "string"}, "alpha": {"type": "number"}},
            "account": {"id": {"type": "string", "required": true}}
        }"#;
        let snapshot: EntitySnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(
            snapshot.entity_names().collect::<Vec<_>>(),
            vec!["user", "account"]
        );
        let user = snapshot.entity("user").unwrap();
        assert_eq!(user.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_duplicate_field_key_is_rejected() {
        let json = r#"{"user": {"a": {"type": "string"}, "a": {"type": "number"}}}"#;
        let err = serde_json::from_str::<EntitySnapshot>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate field key `a`"));
    }

    #[test]
    fn test_serialize_keeps_order() {
        let snapshot = EntitySnapshot::new().with_entity(
            "session",
            EntityFields::new()
                .with_field("token", FieldAttribute::string().required())
                .with_field("expiresAt", FieldAttribute::date()),
        );
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"session":{"token":{"type":"string","required":true},"expiresAt":{"type":"date","required":false}}}"#
        );
    }

    #[test]
    fn test_field_count_for_missing_entity_is_zero() {
        let snapshot = EntitySnapshot::new();
        assert_eq!(snapshot.field_count("user"), 0);
        assert!(!snapshot.contains_entity("user"));
    }
}
