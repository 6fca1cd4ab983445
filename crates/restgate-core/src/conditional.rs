//! Conditional requests
//!
//! Entity tags are derived purely from the representation a caller receives,
//! so two callers with different level sets see different tags for the same
//! record. The coordinator runs once per request:
//!
//! `Init -> EtagComputed -> CacheChecked (GET) | PreconditionChecked (mutations) -> Done`

use std::fmt;

use restgate_types::hasher;

use crate::prelude::*;

/// Methods that must carry `If-Match`.
pub const METHODS_REQUIRE_IF_MATCH: &[&str] = &["PUT", "DELETE", "PATCH"];

// EntityTag //
//***********//
/// Strong validator value, stored without quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag(Box<str>);

impl EntityTag {
	/// Tag of serialized content: `<prefix>-<base64(sha256(content))>`.
	pub fn from_content(prefix: &str, content: &[u8]) -> Self {
		Self(hasher::hash(prefix, content))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// Quoted form, as sent in the `ETag` header.
impl fmt::Display for EntityTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "\"{}\"", self.0)
	}
}

// TagList //
//*********//
/// One validator listed in a conditional header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedTag {
	pub value: Box<str>,
	/// Sent as `W/"..."`
	pub weak: bool,
}

impl ListedTag {
	pub fn strong(value: impl Into<Box<str>>) -> Self {
		Self { value: value.into(), weak: false }
	}

	pub fn weak(value: impl Into<Box<str>>) -> Self {
		Self { value: value.into(), weak: true }
	}
}

/// Parsed `If-Match` / `If-None-Match` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagList {
	Any,
	Tags(Vec<ListedTag>),
}

impl TagList {
	pub fn parse(header: &str) -> Self {
		let header = header.trim();
		if header == "*" {
			return Self::Any;
		}

		let mut tags = Vec::new();
		let mut rest = header;
		loop {
			rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
			if rest.is_empty() {
				break;
			}
			if rest == "*" || rest.starts_with("*,") {
				return Self::Any;
			}
			let (item, weak) = match rest.strip_prefix("W/") {
				Some(item) => (item, true),
				None => (rest, false),
			};
			let value: Box<str> = if let Some(quoted) = item.strip_prefix('"') {
				let end = quoted.find('"').unwrap_or(quoted.len());
				rest = quoted.get(end + 1..).unwrap_or_default();
				quoted[..end].into()
			} else {
				let end = item.find(',').unwrap_or(item.len());
				rest = &item[end..];
				item[..end].trim().into()
			};
			tags.push(ListedTag { value, weak });
		}
		Self::Tags(tags)
	}

	/// Weak comparison, used for `If-None-Match`: weak and strong listed
	/// tags match by opaque value.
	pub fn matches_weak(&self, etag: &EntityTag) -> bool {
		match self {
			Self::Any => true,
			Self::Tags(tags) => tags.iter().any(|tag| *tag.value == *etag.as_str()),
		}
	}

	/// Strong comparison, used for `If-Match`: a weak listed tag never matches.
	pub fn matches_strong(&self, etag: &EntityTag) -> bool {
		match self {
			Self::Any => true,
			Self::Tags(tags) => tags.iter().any(|tag| !tag.weak && *tag.value == *etag.as_str()),
		}
	}
}

// ConditionalCoordinator //
//************************//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalState {
	Init,
	EtagComputed,
	CacheChecked,
	PreconditionChecked,
	Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodClass {
	Read,
	Mutation,
	Other,
}

#[derive(Debug)]
pub struct ConditionalCoordinator {
	method: MethodClass,
	if_match: Option<TagList>,
	if_none_match: Option<TagList>,
	require_if_match: bool,
	state: ConditionalState,
	etag: Option<EntityTag>,
}

impl ConditionalCoordinator {
	pub fn new(method: &str, if_match: Option<&str>, if_none_match: Option<&str>) -> Self {
		let method = if method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD") {
			MethodClass::Read
		} else if METHODS_REQUIRE_IF_MATCH.iter().any(|m| m.eq_ignore_ascii_case(method)) {
			MethodClass::Mutation
		} else {
			MethodClass::Other
		};
		Self {
			method,
			if_match: if_match.map(TagList::parse),
			if_none_match: if_none_match.map(TagList::parse),
			require_if_match: true,
			state: ConditionalState::Init,
			etag: None,
		}
	}

	/// Whether mutations without `If-Match` are rejected (default `true`).
	pub fn require_if_match(mut self, require: bool) -> Self {
		self.require_if_match = require;
		self
	}

	pub fn state(&self) -> ConditionalState {
		self.state
	}

	/// Record the tag of the current representation and enforce the
	/// conditional headers for this method.
	///
	/// GET: `NotModified` when `If-None-Match` matches. Mutations:
	/// `PreconditionRequired` without `If-Match`, `PreconditionFailed` when it
	/// does not match.
	pub fn check(&mut self, etag: EntityTag) -> RgResult<()> {
		if self.state != ConditionalState::Init {
			return Err(Error::Internal("conditional check ran twice".into()));
		}
		self.state = ConditionalState::EtagComputed;

		let result = match self.method {
			MethodClass::Read => {
				self.state = ConditionalState::CacheChecked;
				if self.if_none_match.as_ref().is_some_and(|list| list.matches_weak(&etag)) {
					debug!(etag = %etag, "representation not modified");
					Err(Error::NotModified)
				} else {
					Ok(())
				}
			}
			MethodClass::Mutation => {
				self.state = ConditionalState::PreconditionChecked;
				match &self.if_match {
					None if self.require_if_match => {
						debug!("mutation without If-Match");
						Err(Error::PreconditionRequired)
					}
					Some(list) if !list.matches_strong(&etag) => {
						debug!(etag = %etag, "If-Match does not match");
						Err(Error::PreconditionFailed)
					}
					_ => Ok(()),
				}
			}
			MethodClass::Other => Ok(()),
		};

		self.etag = Some(etag);
		result
	}

	pub fn etag(&self) -> Option<&EntityTag> {
		self.etag.as_ref()
	}

	/// Finish the request. Returns the tag to send back, which only read
	/// requests carry.
	pub fn finish(mut self) -> Option<EntityTag> {
		self.state = ConditionalState::Done;
		match self.method {
			MethodClass::Read => self.etag.take(),
			MethodClass::Mutation | MethodClass::Other => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tag() -> EntityTag {
		EntityTag::from_content("json", br#"{"username":"spam"}"#)
	}

	#[test]
	fn test_entity_tag_format() {
		let etag = tag();
		assert!(etag.as_str().starts_with("json-"));
		assert!(!etag.as_str().contains('='));
		assert_eq!(etag.to_string(), format!("\"{}\"", etag.as_str()));
		assert_eq!(etag, tag());
	}

	#[test]
	fn test_tag_list_parsing() {
		assert_eq!(TagList::parse("*"), TagList::Any);
		assert_eq!(
			TagList::parse("\"a\", W/\"b\",\"c\""),
			TagList::Tags(vec![ListedTag::strong("a"), ListedTag::weak("b"), ListedTag::strong("c")])
		);
		assert_eq!(TagList::parse("bare"), TagList::Tags(vec![ListedTag::strong("bare")]));
		assert_eq!(TagList::parse(""), TagList::Tags(vec![]));
	}

	#[test]
	fn test_get_not_modified() {
		let header = tag().to_string();
		let mut coord = ConditionalCoordinator::new("GET", None, Some(&header));
		assert!(matches!(coord.check(tag()), Err(Error::NotModified)));
		assert_eq!(coord.state(), ConditionalState::CacheChecked);

		let mut coord = ConditionalCoordinator::new("GET", None, Some("W/\"other\", *"));
		assert!(matches!(coord.check(tag()), Err(Error::NotModified)));

		let mut coord = ConditionalCoordinator::new("GET", None, Some("\"other\""));
		coord.check(tag()).unwrap();
		assert_eq!(coord.finish(), Some(tag()));
	}

	#[test]
	fn test_mutation_preconditions() {
		let mut coord = ConditionalCoordinator::new("PATCH", None, None);
		assert!(matches!(coord.check(tag()), Err(Error::PreconditionRequired)));
		assert_eq!(coord.state(), ConditionalState::PreconditionChecked);

		let mut coord = ConditionalCoordinator::new("PATCH", Some("\"stale\""), None);
		assert!(matches!(coord.check(tag()), Err(Error::PreconditionFailed)));

		let header = tag().to_string();
		let mut coord = ConditionalCoordinator::new("PATCH", Some(&header), None);
		coord.check(tag()).unwrap();
		assert_eq!(coord.finish(), None);

		let mut coord = ConditionalCoordinator::new("DELETE", Some("*"), None);
		coord.check(tag()).unwrap();
	}

	#[test]
	fn test_weak_validators() {
		let weak = format!("W/{}", tag());

		// If-None-Match compares weakly
		let mut coord = ConditionalCoordinator::new("GET", None, Some(&weak));
		assert!(matches!(coord.check(tag()), Err(Error::NotModified)));

		// If-Match compares strongly
		let mut coord = ConditionalCoordinator::new("PATCH", Some(&weak), None);
		assert!(matches!(coord.check(tag()), Err(Error::PreconditionFailed)));

		let both = format!("{}, {}", weak, tag());
		let mut coord = ConditionalCoordinator::new("PATCH", Some(&both), None);
		coord.check(tag()).unwrap();
	}

	#[test]
	fn test_if_match_optional_when_configured() {
		let mut coord = ConditionalCoordinator::new("PATCH", None, None).require_if_match(false);
		coord.check(tag()).unwrap();

		let mut coord =
			ConditionalCoordinator::new("PATCH", Some("\"stale\""), None).require_if_match(false);
		assert!(matches!(coord.check(tag()), Err(Error::PreconditionFailed)));
	}

	#[test]
	fn test_get_ignores_if_match_and_check_runs_once() {
		let mut coord = ConditionalCoordinator::new("GET", Some("\"stale\""), None);
		coord.check(tag()).unwrap();
		assert!(matches!(coord.check(tag()), Err(Error::Internal(_))));
	}
}

// vim: ts=4
