//! Entity type descriptors
//!
//! An entity type bundles everything the resource layer needs to expose one
//! kind of stored record: its field policy, its authorizer, its key field and
//! its default ordering. Descriptors are built once at startup.

use std::sync::Arc;

use restgate_types::types::SortField;

use crate::access::{AccessHierarchy, LevelSet};
use crate::authorizer::{SubjectAuthorizer, SystemOnly};
use crate::policy::FieldAccessPolicy;
use crate::prelude::*;

/// Default collection ordering of an entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Ordering {
	/// Ascending by the key field
	#[default]
	ByKey,
	Explicit(Vec<SortField>),
	/// Deliberately unordered; the store returns records in its own order
	Unordered,
}

#[derive(Debug, Clone)]
pub struct EntityType {
	pub name: Box<str>,
	pub key_field: Box<str>,
	pub policy: Arc<FieldAccessPolicy>,
	pub authorizer: Arc<dyn SubjectAuthorizer>,
	pub ordering: Ordering,
}

impl EntityType {
	pub fn builder(name: impl Into<Box<str>>) -> EntityTypeBuilder {
		EntityTypeBuilder::new(name)
	}

	pub fn class_levels(&self, subject: &Subject) -> LevelSet {
		self.authorizer.class_levels(subject)
	}

	pub fn instance_levels(&self, record: &Record, subject: &Subject) -> LevelSet {
		self.authorizer.instance_levels(record, subject)
	}

	/// Sort fields for collection fetches.
	pub fn sort_fields(&self) -> Vec<SortField> {
		match &self.ordering {
			Ordering::ByKey => vec![SortField::asc(self.key_field.clone())],
			Ordering::Explicit(fields) => fields.clone(),
			Ordering::Unordered => Vec::new(),
		}
	}
}

// EntityTypeBuilder //
//*******************//
#[derive(Debug)]
pub struct EntityTypeBuilder {
	name: Box<str>,
	key_field: Box<str>,
	fields: Vec<(Box<str>, Box<str>)>,
	authorizer: Option<Arc<dyn SubjectAuthorizer>>,
	ordering: Ordering,
}

impl EntityTypeBuilder {
	pub fn new(name: impl Into<Box<str>>) -> Self {
		Self {
			name: name.into(),
			key_field: "id".into(),
			fields: Vec::new(),
			authorizer: None,
			ordering: Ordering::default(),
		}
	}

	/// Field identifying a record; defaults to `id`.
	pub fn key(mut self, field: impl Into<Box<str>>) -> Self {
		self.key_field = field.into();
		self
	}

	/// Bind `field` to a permission directive.
	pub fn field(mut self, field: impl Into<Box<str>>, directive: impl Into<Box<str>>) -> Self {
		self.fields.push((field.into(), directive.into()));
		self
	}

	pub fn authorizer(mut self, authorizer: impl SubjectAuthorizer + 'static) -> Self {
		self.authorizer = Some(Arc::new(authorizer));
		self
	}

	pub fn ordering(mut self, ordering: Ordering) -> Self {
		self.ordering = ordering;
		self
	}

	/// Parse every directive against `hierarchy` and freeze the descriptor.
	pub fn build(self, hierarchy: &AccessHierarchy) -> RgResult<EntityType> {
		let policy = FieldAccessPolicy::parse(
			hierarchy,
			self.fields.iter().map(|(name, directive)| (&**name, &**directive)),
		)
		.map_err(|err| match err {
			Error::ConfigError(msg) => {
				Error::ConfigError(format!("entity '{}': {}", self.name, msg))
			}
			other => other,
		})?;

		if !policy.contains(&self.key_field) {
			return Err(Error::ConfigError(format!(
				"entity '{}': key field '{}' has no permission directive",
				self.name, self.key_field
			)));
		}
		if let Ordering::Explicit(fields) = &self.ordering {
			if let Some(unknown) = fields.iter().find(|sf| !policy.contains(&sf.field)) {
				return Err(Error::ConfigError(format!(
					"entity '{}': cannot order by unknown field '{}'",
					self.name, unknown.field
				)));
			}
		}

		let authorizer = self.authorizer.unwrap_or_else(|| Arc::new(SystemOnly));
		if let Some(unknown) = authorizer.granted_levels().into_iter().find(|l| !hierarchy.contains(l)) {
			return Err(Error::ConfigError(format!(
				"entity '{}': authorizer grants level '{}' missing from the access hierarchy",
				self.name, unknown
			)));
		}

		debug!(entity = %self.name, fields = policy.field_names().count(), "entity type registered");

		Ok(EntityType {
			name: self.name,
			key_field: self.key_field,
			policy: Arc::new(policy),
			authorizer,
			ordering: self.ordering,
		})
	}
}


// vim: ts=4
