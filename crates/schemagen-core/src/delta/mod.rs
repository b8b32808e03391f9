//! Schema delta computation and aggregation.
//!
//! ## Entry points
//!
//! ```
//! use schemagen_core::delta::{aggregate, compute_delta};
//! use schemagen_core::model::{EntityFields, EntitySnapshot, FieldAttribute};
//!
//! let base = EntitySnapshot::new().with_entity(
//!     "user",
//!     EntityFields::new().with_field("email", FieldAttribute::string().required()),
//! );
//! let with_admin = base.clone().with_entity(
//!     "user",
//!     EntityFields::new()
//!         .with_field("email", FieldAttribute::string().required())
//!         .with_field("banned", FieldAttribute::boolean()),
//! );
//!
//! let delta = compute_delta(&base, &with_admin);
//! assert!(delta.entity("user").unwrap().contains_key("banned"));
//!
//! let model = aggregate(&base, &[("admin".to_string(), with_admin)]);
//! assert_eq!(model.entity_names(), vec!["user"]);
//! ```
//!
//! ## Guarantees
//!
//! - A delta never contains a key the base entity already has.
//! - Extension ids are deduplicated, first occurrence wins.
//! - Every entity's [`EntityShape`] is computed once, here.

pub mod aggregate;
pub mod compute;
pub mod model;

pub use aggregate::aggregate;
pub use compute::{compute_delta, find_redefinitions};
pub use model::{
    AggregatedModel, DeltaMap, DroppedExtension, EntityDelta, EntityShape, ExtensionDelta,
    FieldRedefinition, PlannedEntity,
};
