//! Entity mapping engine
//!
//! Generic storage with dirty tracking, structural XML loading and the closed
//! registry that turns XML tags into entity types.

pub mod model;
pub mod projection;
pub mod record;
pub mod registry;
pub mod value;

pub use model::Model;
pub(crate) use model::entity_model;
pub use projection::{Projected, Projection};
pub use record::{Entity, FieldRef, ParentLink, Relation};
pub use registry::{EntityKind, Resource};
pub use value::Value;
