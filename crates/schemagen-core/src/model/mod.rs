pub mod field;
pub mod snapshot;

pub use field::{FieldAttribute, FieldType};
pub use snapshot::{EntityFields, EntitySnapshot, ExtensionDescriptor};
