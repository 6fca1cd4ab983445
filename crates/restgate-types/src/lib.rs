//! Shared types, the storage adapter trait, and core utilities for restgate.
//!
//! This crate contains the foundational types that are shared between the
//! resource layer, the HTTP integration crate and all storage adapter
//! implementations.

pub mod error;
pub mod hasher;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
