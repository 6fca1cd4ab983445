//! Subject authorization: which access levels a caller holds for an entity
//! type (class level) or a specific record (instance level).

use serde_json::Value;
use std::fmt::Debug;

use crate::access::LevelSet;
use crate::prelude::*;

pub const ANONYMOUS_LEVEL: &str = "anonymous";
pub const AUTHENTICATED_LEVEL: &str = "authenticated";
pub const OWNER_LEVEL: &str = "owner";

/// Resolves a caller's level set. Entity types plug in their own resolution.
///
/// Both methods default to the `system`-only set: an entity type that does not
/// specialize them is invisible to external callers.
pub trait SubjectAuthorizer: Debug + Send + Sync {
	/// Levels held with respect to the entity type as a whole.
	fn class_levels(&self, _subject: &Subject) -> LevelSet {
		LevelSet::system()
	}

	/// Levels held with respect to one record. May add `owner`.
	fn instance_levels(&self, _record: &Record, subject: &Subject) -> LevelSet {
		self.class_levels(subject)
	}

	/// Every hierarchy level this authorizer may grant, checked against the
	/// access hierarchy when the entity type is built. The `system` fallback
	/// is not listed.
	fn granted_levels(&self) -> Vec<&str> {
		Vec::new()
	}
}

/// Fallback authorizer for entity types that do not resolve callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOnly;

impl SubjectAuthorizer for SystemOnly {}

// OwnerAuthorizer //
//*****************//
/// Splits anonymous from authenticated callers, maps subject roles to levels,
/// and grants `owner` when a record field holds the subject's id.
#[derive(Debug, Clone)]
pub struct OwnerAuthorizer {
	owner_field: Option<Box<str>>,
	role_levels: Box<[Box<str>]>,
}

impl OwnerAuthorizer {
	/// `owner_field` is the record field compared against the subject id.
	/// Subject roles `staff` and `admin` become levels of the same name.
	pub fn new(owner_field: impl Into<Box<str>>) -> Self {
		Self { owner_field: Some(owner_field.into()), role_levels: Box::new(["staff".into(), "admin".into()]) }
	}

	/// No ownership concept, only the anonymous/authenticated split and roles.
	pub fn without_owner() -> Self {
		Self { owner_field: None, role_levels: Box::new(["staff".into(), "admin".into()]) }
	}

	/// Replace the subject roles that translate into access levels.
	pub fn role_levels(mut self, roles: impl IntoIterator<Item = impl Into<Box<str>>>) -> Self {
		self.role_levels = roles.into_iter().map(Into::into).collect();
		self
	}

	fn is_owner(&self, record: &Record, subject_id: &str) -> bool {
		let Some(field) = self.owner_field.as_deref() else {
			return false;
		};
		match record.get(field) {
			Some(Value::String(s)) => s == subject_id,
			Some(Value::Number(n)) => n.to_string() == subject_id,
			_ => false,
		}
	}
}

impl SubjectAuthorizer for OwnerAuthorizer {
	fn class_levels(&self, subject: &Subject) -> LevelSet {
		let mut levels = LevelSet::new();
		if subject.is_authenticated() {
			levels.insert(AUTHENTICATED_LEVEL);
			for role in &self.role_levels {
				if subject.has_role(role) {
					levels.insert(role.clone());
				}
			}
		} else {
			levels.insert(ANONYMOUS_LEVEL);
		}
		levels
	}

	fn granted_levels(&self) -> Vec<&str> {
		let mut levels = vec![ANONYMOUS_LEVEL, AUTHENTICATED_LEVEL];
		if self.owner_field.is_some() {
			levels.push(OWNER_LEVEL);
		}
		levels.extend(self.role_levels.iter().map(|role| &**role));
		levels
	}

	fn instance_levels(&self, record: &Record, subject: &Subject) -> LevelSet {
		let mut levels = self.class_levels(subject);
		if let Some(id) = subject.id.as_deref() {
			if self.is_owner(record, id) {
				levels.insert(OWNER_LEVEL);
			}
		}
		levels
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn record(value: Value) -> Record {
		match value {
			Value::Object(map) => map,
			_ => Record::new(),
		}
	}

	#[test]
	fn test_system_only_default() {
		let auth = SystemOnly;
		let subject = Subject::authenticated("spam").with_roles(["admin"]);
		assert_eq!(auth.class_levels(&subject), LevelSet::system());
		assert_eq!(auth.instance_levels(&Record::new(), &subject), LevelSet::system());
	}

	#[test]
	fn test_anonymous_and_authenticated_split() {
		let auth = OwnerAuthorizer::new("username");
		assert_eq!(auth.class_levels(&Subject::anonymous()), LevelSet::single("anonymous"));
		assert_eq!(
			auth.class_levels(&Subject::authenticated("ham")),
			LevelSet::single("authenticated")
		);
	}

	#[test]
	fn test_owner_and_roles() {
		let auth = OwnerAuthorizer::new("username");
		let rec = record(json!({"username": "spam"}));

		let levels = auth.instance_levels(&rec, &Subject::authenticated("spam"));
		assert!(levels.contains("owner"));
		assert!(levels.contains("authenticated"));

		let levels = auth.instance_levels(&rec, &Subject::authenticated("ham").with_roles(["staff"]));
		assert!(!levels.contains("owner"));
		assert!(levels.contains("staff"));

		let levels = auth.instance_levels(&rec, &Subject::anonymous());
		assert_eq!(levels, LevelSet::single("anonymous"));
	}

	#[test]
	fn test_numeric_owner_field() {
		let auth = OwnerAuthorizer::new("user_id");
		let rec = record(json!({"user_id": 7}));
		assert!(auth.instance_levels(&rec, &Subject::authenticated("7")).contains("owner"));
		assert!(!auth.instance_levels(&rec, &Subject::authenticated("8")).contains("owner"));
	}

	#[test]
	fn test_granted_levels() {
		assert!(SystemOnly.granted_levels().is_empty());
		assert_eq!(
			OwnerAuthorizer::new("user").granted_levels(),
			vec!["anonymous", "authenticated", "owner", "staff", "admin"]
		);
		assert_eq!(
			OwnerAuthorizer::without_owner().role_levels(["editor"]).granted_levels(),
			vec!["anonymous", "authenticated", "editor"]
		);
	}

	#[test]
	fn test_unknown_roles_are_ignored() {
		let auth = OwnerAuthorizer::without_owner();
		let levels = auth.class_levels(&Subject::authenticated("x").with_roles(["wizard"]));
		assert_eq!(levels, LevelSet::single("authenticated"));
	}
}

// vim: ts=4
