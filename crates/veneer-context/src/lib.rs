//! Veneer Projection Contexts
//!
//! A [`ProjectionContext`] overlays the attributes of an
//! [`AttributeTable`](veneer_table::AttributeTable) onto a type-system graph
//! without touching it. Projecting a real type or assembly yields a proxy
//! that answers every structural query like the real entity, reports the
//! overlay in its attribute queries, and projects whatever it hands out
//! through the same context.
//!
//! ```
//! use std::sync::Arc;
//! use veneer_context::ProjectionContext;
//! use veneer_table::AttributeTableBuilder;
//! use veneer_types::{Attribute, AttributeKind, AttributeProvider, TypeKind, UniverseBuilder};
//!
//! let mut builder = UniverseBuilder::new();
//! let asm = builder.add_assembly("Lib", Default::default());
//! let foo = builder.add_type(asm, "Lib", "Foo", TypeKind::Class);
//! let universe = builder.build().unwrap();
//! let foo = universe.ty(foo).unwrap();
//!
//! let obsolete = AttributeKind::new("ObsoleteAttribute");
//! let mut table = AttributeTableBuilder::new();
//! table.add_type_attributes(foo.as_ref(), [Attribute::new(obsolete.clone())]);
//!
//! let context = ProjectionContext::new(Arc::new(table.build()));
//! let projected = context.map_type(&foo);
//! assert!(projected.is_defined(&obsolete, true));
//! assert!(!foo.is_defined(&obsolete, true));
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod projected;

pub use context::{ContextOptions, Entity, ProjectionContext};
pub use projected::{
    ProjectedAssembly, ProjectedEvent, ProjectedField, ProjectedMethod, ProjectedParameter,
    ProjectedProperty, ProjectedType,
};
