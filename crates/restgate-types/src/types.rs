//! Common types used throughout restgate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A persisted entity as seen by the resource layer: field name -> value.
pub type Record = serde_json::Map<String, Value>;

// Subject //
//*********//
/// The caller a request is evaluated for.
///
/// `id` is `None` for anonymous callers. `roles` carries role names asserted by
/// the authentication layer (e.g. `staff`, `admin`); authorizers decide which
/// of them translate into access levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
	pub id: Option<Box<str>>,
	pub roles: Box<[Box<str>]>,
}

impl Subject {
	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn authenticated(id: impl Into<Box<str>>) -> Self {
		Self { id: Some(id.into()), roles: Box::new([]) }
	}

	pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<Box<str>>>) -> Self {
		self.roles = roles.into_iter().map(Into::into).collect();
		self
	}

	pub fn is_authenticated(&self) -> bool {
		self.id.is_some()
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r.as_ref() == role)
	}
}

// FilterOp //
//**********//
/// Comparison operator of a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
}

impl FilterOp {
	/// Resolve a 3-character query value prefix like `"ge:"`.
	pub fn from_prefix(prefix: &str) -> Option<Self> {
		match prefix {
			"eq:" => Some(Self::Eq),
			"ne:" => Some(Self::Ne),
			"lt:" => Some(Self::Lt),
			"le:" => Some(Self::Le),
			"gt:" => Some(Self::Gt),
			"ge:" => Some(Self::Ge),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Eq => "eq",
			Self::Ne => "ne",
			Self::Lt => "lt",
			Self::Le => "le",
			Self::Gt => "gt",
			Self::Ge => "ge",
		}
	}
}

impl fmt::Display for FilterOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single predicate on a record field. Clauses are always ANDed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
	pub field: Box<str>,
	pub op: FilterOp,
	pub value: Value,
}

impl FilterClause {
	pub fn new(field: impl Into<Box<str>>, op: FilterOp, value: Value) -> Self {
		Self { field: field.into(), op, value }
	}

	pub fn eq(field: impl Into<Box<str>>, value: Value) -> Self {
		Self::new(field, FilterOp::Eq, value)
	}
}

/// One sort key of a list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
	pub field: Box<str>,
	pub ascending: bool,
}

impl SortField {
	pub fn asc(field: impl Into<Box<str>>) -> Self {
		Self { field: field.into(), ascending: true }
	}

	pub fn desc(field: impl Into<Box<str>>) -> Self {
		Self { field: field.into(), ascending: false }
	}
}

/// Options for listing records of one entity type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
	pub criteria: Vec<FilterClause>,
	pub order: Vec<SortField>,
	pub offset: u64,
	pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_filter_op_prefix() {
		assert_eq!(FilterOp::from_prefix("ge:"), Some(FilterOp::Ge));
		assert_eq!(FilterOp::from_prefix("eq:"), Some(FilterOp::Eq));
		assert_eq!(FilterOp::from_prefix("xx:"), None);
		assert_eq!(FilterOp::from_prefix("ge"), None);
	}

	#[test]
	fn test_subject_roles() {
		let subject = Subject::authenticated("spam").with_roles(["staff"]);
		assert!(subject.is_authenticated());
		assert!(subject.has_role("staff"));
		assert!(!subject.has_role("admin"));
		assert!(!Subject::anonymous().is_authenticated());
	}
}

// vim: ts=4
