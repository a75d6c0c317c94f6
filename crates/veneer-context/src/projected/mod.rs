//! Projected stand-ins for real entities
//!
//! Each proxy holds the wrapped entity and the context that produced it.
//! Proxies are created through [`ProjectionContext`](crate::ProjectionContext)
//! only.

mod assembly;
mod members;
mod parameter;
mod ty;

pub use assembly::ProjectedAssembly;
pub use members::{ProjectedEvent, ProjectedField, ProjectedMethod, ProjectedProperty};
pub use parameter::ProjectedParameter;
pub use ty::ProjectedType;
