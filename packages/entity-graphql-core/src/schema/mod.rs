//! Entity schemas, field descriptors, and the registry they are looked up in.

mod entity;
mod field;
pub mod parser;
mod registry;

pub use entity::EntitySchema;
pub use field::{FieldDescriptor, FieldKind};
pub use parser::SchemaParser;
pub use registry::SchemaRegistry;
