//! Field access policy of an entity type
//!
//! A policy binds every exposed field to its parsed permission directive. It is
//! built once when the entity type is registered and is read-only afterwards.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::access::{AccessHierarchy, LevelSet, PermissionDirective};
use crate::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAccessPolicy {
	fields: BTreeMap<Box<str>, PermissionDirective>,
}

impl FieldAccessPolicy {
	/// Parse `(field, directive)` pairs against `hierarchy`.
	///
	/// Any malformed directive fails the whole policy, so a bad grant surfaces at
	/// registration instead of on the first request.
	pub fn parse<'a>(
		hierarchy: &AccessHierarchy,
		fields: impl IntoIterator<Item = (&'a str, &'a str)>,
	) -> RgResult<Self> {
		let mut policy = Self::default();
		for (name, directive) in fields {
			if policy.fields.contains_key(name) {
				return Err(Error::ConfigError(format!("field '{}' bound twice", name)));
			}
			let parsed = hierarchy.parse(directive).map_err(|err| match err {
				Error::ConfigError(msg) => Error::ConfigError(format!("field '{}': {}", name, msg)),
				other => other,
			})?;
			policy.fields.insert(name.into(), parsed);
		}
		Ok(policy)
	}

	pub fn directive(&self, field: &str) -> Option<&PermissionDirective> {
		self.fields.get(field)
	}

	pub fn contains(&self, field: &str) -> bool {
		self.fields.contains_key(field)
	}

	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(|k| &**k)
	}

	pub fn is_readable(&self, field: &str, levels: &LevelSet) -> bool {
		self.directive(field).is_some_and(|d| d.is_readable_by(levels))
	}

	pub fn is_writeable(&self, field: &str, levels: &LevelSet) -> bool {
		self.directive(field).is_some_and(|d| d.is_writeable_by(levels))
	}

	pub fn readable_fields<'a>(&'a self, levels: &'a LevelSet) -> impl Iterator<Item = &'a str> {
		self.fields.iter().filter(|(_, d)| d.is_readable_by(levels)).map(|(k, _)| &**k)
	}

	/// Project `record` onto the fields readable by `levels`.
	///
	/// Fields of the record that the policy does not bind are never exposed.
	/// Readable fields missing from the record render as `null`.
	pub fn project(&self, record: &Record, levels: &LevelSet) -> Record {
		self.readable_fields(levels)
			.map(|name| (name.to_string(), record.get(name).cloned().unwrap_or(Value::Null)))
			.collect()
	}
}


// vim: ts=4
