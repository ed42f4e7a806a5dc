//! Entity and association metadata.

mod association;
mod column;
mod definition;
mod entity;
pub mod naming;
mod registry;

pub use association::{Association, AssociationKind, JoinTable};
pub use column::{Column, ColumnType};
pub use definition::{AssociationDefinition, ColumnDefinition, EntityDefinition, SchemaDefinition};
pub use entity::{Entity, EntityBuilder};
pub use registry::SchemaRegistry;
