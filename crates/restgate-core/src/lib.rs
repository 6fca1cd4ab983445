//! Core resource layer for restgate.
//!
//! Everything here is transport independent: the HTTP integration crate feeds
//! header values and decoded bodies in, and turns results and errors into
//! responses.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod access;
pub mod authorizer;
pub mod conditional;
pub mod entity;
pub mod filter;
pub mod format;
pub mod negotiate;
pub mod patch;
pub mod policy;
pub mod prelude;
pub mod range;
pub mod settings;

// Re-export commonly used types
pub use access::{AccessHierarchy, LevelSet, PermissionDirective};
pub use authorizer::{OwnerAuthorizer, SubjectAuthorizer, SystemOnly};
pub use conditional::{ConditionalCoordinator, ConditionalState, EntityTag, ListedTag, TagList};
pub use entity::{EntityType, EntityTypeBuilder, Ordering};
pub use format::{Deserializer, Json, Serializer, Yaml};
pub use negotiate::{DeserializerRegistry, Negotiation, SerializerRegistry};
pub use patch::{AppliedPatch, PartialUpdateProcessor};
pub use policy::FieldAccessPolicy;
pub use range::{ContentRange, RangeWindow};
pub use settings::GateSettings;

// vim: ts=4
