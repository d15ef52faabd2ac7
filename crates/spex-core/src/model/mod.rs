mod element;
mod registry;
mod schema;


// re-exports
pub use element::{Element, Property, PropertyId, THIS};
pub use registry::ElementRegistry;
pub use schema::{FieldDef, OUTCOME_OPTIONS, Schema, TypeDef, TypeExpr, TypeKind};
