//! restgate: typed entities exposed as HTTP resources
//!
//! The HTTP integration of the resource layer. Entity types and their routes
//! are registered on an [`AppBuilder`]; the resulting axum `Router` negotiates
//! formats, enforces field grants, handles conditional requests and paginates
//! collections.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod demo;
pub mod extract;
pub mod handler;
pub mod middleware;
pub mod prelude;
pub mod response;

pub use app::{App, AppBuilder, AppState, Resource, ResourceKind};
pub use extract::Caller;

// vim: ts=4
