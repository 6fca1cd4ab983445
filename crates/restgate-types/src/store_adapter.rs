//! Storage Adapter
//!
//! Trait for pluggable persistence backends. The resource layer issues at most
//! one fetch and, for mutations, one save per request; the adapter owns its
//! transaction and consistency discipline.
//!
//! Each adapter implementation provides its own constructor handling
//! backend-specific initialization.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::{FilterClause, ListQuery};

#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	/// Fetch the single record of `entity` matching all `criteria`.
	///
	/// Returns `Error::NotFound` when nothing matches.
	async fn fetch_one(&self, entity: &str, criteria: &[FilterClause]) -> RgResult<Record>;

	/// Fetch an ordered window of records of `entity`.
	async fn fetch_many(&self, entity: &str, query: &ListQuery) -> RgResult<Vec<Record>>;

	/// Persist `record`, identified by the value of its `key_field`.
	async fn save(&self, entity: &str, key_field: &str, record: &Record) -> RgResult<()>;

	/// Number of records matching `criteria`, if the backend can tell cheaply.
	async fn count(&self, _entity: &str, _criteria: &[FilterClause]) -> RgResult<Option<u64>> {
		Ok(None)
	}
}

// vim: ts=4
