//! In-memory storage adapter
//!
//! Records live in a map keyed by entity name. Every operation takes the lock
//! once, so a fetch never observes half of a save.

#![forbid(unsafe_code)]

pub mod storage;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, warn};

use restgate_types::prelude::{Error, Record, RgResult};
use restgate_types::store_adapter::StoreAdapter;
use restgate_types::types::{FilterClause, ListQuery};

#[derive(Debug, Default)]
pub struct StoreAdapterMemory {
	entities: RwLock<HashMap<Box<str>, Vec<Record>>>,
}

impl StoreAdapterMemory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert records without key checks, for seeding.
	pub fn insert_many(&self, entity: &str, records: impl IntoIterator<Item = Record>) {
		self.entities.write().entry(entity.into()).or_default().extend(records);
	}

	pub fn len(&self, entity: &str) -> usize {
		self.entities.read().get(entity).map_or(0, Vec::len)
	}

	pub fn is_empty(&self, entity: &str) -> bool {
		self.len(entity) == 0
	}
}

#[async_trait]
impl StoreAdapter for StoreAdapterMemory {
	async fn fetch_one(&self, entity: &str, criteria: &[FilterClause]) -> RgResult<Record> {
		let entities = self.entities.read();
		let record = entities
			.get(entity)
			.and_then(|records| records.iter().find(|r| storage::matches_criteria(r, criteria)));
		match record {
			Some(record) => Ok(record.clone()),
			None => {
				debug!(entity = %entity, "no record matches");
				Err(Error::NotFound)
			}
		}
	}

	async fn fetch_many(&self, entity: &str, query: &ListQuery) -> RgResult<Vec<Record>> {
		let entities = self.entities.read();
		Ok(match entities.get(entity) {
			Some(records) => storage::apply_query(records.iter(), query),
			None => Vec::new(),
		})
	}

	async fn save(&self, entity: &str, key_field: &str, record: &Record) -> RgResult<()> {
		let Some(key) = record.get(key_field) else {
			warn!(entity = %entity, key_field = %key_field, "refusing to save record without key");
			return Err(Error::DbError);
		};

		let mut entities = self.entities.write();
		let records = entities.entry(entity.into()).or_default();
		match records.iter_mut().find(|r| r.get(key_field) == Some(key)) {
			Some(existing) => existing.clone_from(record),
			None => records.push(record.clone()),
		}
		Ok(())
	}

	async fn count(&self, entity: &str, criteria: &[FilterClause]) -> RgResult<Option<u64>> {
		let entities = self.entities.read();
		let count = entities.get(entity).map_or(0, |records| {
			records.iter().filter(|r| storage::matches_criteria(r, criteria)).count()
		});
		Ok(u64::try_from(count).ok())
	}
}

// vim: ts=4
