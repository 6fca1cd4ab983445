//! Access level hierarchy and the field permission directive grammar
//!
//! A hierarchy is an ordered list of level names; a grant of `name+` covers
//! `name` and every level after it. Directives are compact strings such as
//! `"r:all,w:owner+"` that are parsed once per field when an entity type is
//! registered.

use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

use crate::prelude::*;

/// Default hierarchy, lowest to highest
pub const DEFAULT_ACCESS_HIERARCHY: &[&str] =
	&["anonymous", "authenticated", "owner", "staff", "admin", "system"];

/// Level held by internal code when an entity type does not resolve callers
pub const SYSTEM_LEVEL: &str = "system";

/// Pseudo-levels of the directive grammar; never valid hierarchy members
pub const RESERVED_LEVEL_NAMES: &[&str] = &["all", "none"];

// LevelSet //
//**********//
/// Set of access levels, kept sorted so rendering is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LevelSet(BTreeSet<Box<str>>);

impl LevelSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// The fail-closed fallback: only internal code holds it.
	pub fn system() -> Self {
		Self::single(SYSTEM_LEVEL)
	}

	pub fn single(level: impl Into<Box<str>>) -> Self {
		let mut set = Self::new();
		set.insert(level);
		set
	}

	pub fn insert(&mut self, level: impl Into<Box<str>>) {
		self.0.insert(level.into());
	}

	pub fn contains(&self, level: &str) -> bool {
		self.0.contains(level)
	}

	pub fn intersects(&self, other: &LevelSet) -> bool {
		let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
		small.0.iter().any(|level| large.0.contains(level))
	}

	pub fn is_subset(&self, other: &LevelSet) -> bool {
		self.0.is_subset(&other.0)
	}

	pub fn union_with(&mut self, other: &LevelSet) {
		self.0.extend(other.0.iter().cloned());
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|l| &**l)
	}

	pub fn is_system_only(&self) -> bool {
		self.len() == 1 && self.contains(SYSTEM_LEVEL)
	}

	/// Value for the `X-Access-Classes` header, `None` when the set is empty or
	/// exactly the system fallback.
	pub fn access_classes(&self) -> Option<String> {
		if self.is_empty() || self.is_system_only() {
			None
		} else {
			Some(self.iter().join(", "))
		}
	}
}

impl<S: Into<Box<str>>> FromIterator<S> for LevelSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

impl<S: Into<Box<str>>> Extend<S> for LevelSet {
	fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
		self.0.extend(iter.into_iter().map(Into::into));
	}
}

impl fmt::Display for LevelSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{{}}}", self.iter().join(", "))
	}
}

// PermissionDirective //
//*********************//
/// Parsed grants of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionDirective {
	pub readable: LevelSet,
	pub writeable: LevelSet,
}

impl PermissionDirective {
	/// Grants for fields bound without a directive: visible to system code only.
	pub fn system_only() -> Self {
		Self { readable: LevelSet::system(), writeable: LevelSet::system() }
	}

	pub fn is_readable_by(&self, levels: &LevelSet) -> bool {
		self.readable.intersects(levels)
	}

	pub fn is_writeable_by(&self, levels: &LevelSet) -> bool {
		self.writeable.intersects(levels)
	}
}

// AccessHierarchy //
//*****************//
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessHierarchy {
	levels: Box<[Box<str>]>,
}

impl AccessHierarchy {
	/// Build a hierarchy from level names ordered lowest to highest.
	pub fn new(levels: impl IntoIterator<Item = impl Into<Box<str>>>) -> RgResult<Self> {
		let levels: Box<[Box<str>]> = levels.into_iter().map(Into::into).collect();

		if levels.is_empty() {
			return Err(Error::ConfigError("access hierarchy must not be empty".into()));
		}
		for (idx, level) in levels.iter().enumerate() {
			if RESERVED_LEVEL_NAMES.contains(&level.as_ref()) {
				return Err(Error::ConfigError(format!(
					"'{}' is a reserved name and cannot be an access level",
					level
				)));
			}
			if level.is_empty()
				|| level.ends_with('+')
				|| level.chars().any(|c| c == ',' || c == ':' || c.is_whitespace())
			{
				return Err(Error::ConfigError(format!("invalid access level name '{}'", level)));
			}
			if levels[..idx].contains(level) {
				return Err(Error::ConfigError(format!("duplicate access level '{}'", level)));
			}
		}

		Ok(Self { levels })
	}

	pub fn levels(&self) -> impl Iterator<Item = &str> {
		self.levels.iter().map(|l| &**l)
	}

	pub fn position(&self, level: &str) -> Option<usize> {
		self.levels.iter().position(|l| l.as_ref() == level)
	}

	pub fn contains(&self, level: &str) -> bool {
		self.position(level).is_some()
	}

	/// Every level of the hierarchy.
	pub fn all(&self) -> LevelSet {
		self.levels().collect()
	}

	/// `level` and every level after it in hierarchy order.
	pub fn at_or_above(&self, level: &str) -> RgResult<LevelSet> {
		let idx = self.position(level).ok_or_else(|| {
			Error::ConfigError(format!("undefined access level '{}'", level))
		})?;
		Ok(self.levels[idx..].iter().map(|l| &**l).collect())
	}

	/// Resolve one level expression: `all`, `none`, `name+` or `name`.
	pub fn resolve(&self, expr: &str) -> RgResult<LevelSet> {
		match expr {
			"all" => Ok(self.all()),
			"none" => Ok(LevelSet::new()),
			_ => {
				if let Some(name) = expr.strip_suffix('+') {
					self.at_or_above(name)
				} else if self.contains(expr) {
					Ok(LevelSet::single(expr))
				} else {
					Err(Error::ConfigError(format!("undefined access level '{}'", expr)))
				}
			}
		}
	}

	/// Parse a directive string like `"rw:owner,r:staff+"`.
	///
	/// Clauses are `[targets:]level-expr` separated by commas, where targets is
	/// any combination of `r` and `w` (default both). Clauses union into the
	/// target sets, so their order does not matter. Blank clauses are skipped.
	pub fn parse(&self, directive: &str) -> RgResult<PermissionDirective> {
		let mut result = PermissionDirective::default();

		for clause in directive.split(',') {
			let clause = clause.trim();
			if clause.is_empty() {
				continue;
			}

			let (targets, expr) = match clause.split_once(':') {
				Some((targets, expr)) => (targets.trim(), expr.trim()),
				None => ("rw", clause),
			};
			if targets.is_empty() {
				return Err(Error::ConfigError(format!(
					"empty access target in directive '{}'",
					directive
				)));
			}

			let levels = self.resolve(expr).map_err(|err| match err {
				Error::ConfigError(msg) => {
					Error::ConfigError(format!("{} in directive '{}'", msg, directive))
				}
				other => other,
			})?;

			for target in targets.chars() {
				match target {
					'r' => result.readable.union_with(&levels),
					'w' => result.writeable.union_with(&levels),
					other => {
						return Err(Error::ConfigError(format!(
							"unknown access target '{}' in directive '{}'",
							other, directive
						)));
					}
				}
			}
		}

		Ok(result)
	}
}

impl Default for AccessHierarchy {
	fn default() -> Self {
		Self { levels: DEFAULT_ACCESS_HIERARCHY.iter().map(|&l| Box::from(l)).collect() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn set(levels: &[&str]) -> LevelSet {
		levels.iter().copied().collect()
	}

	#[test]
	fn test_parse_mixed_targets() {
		let hier = AccessHierarchy::default();

		let d = hier.parse("rw:owner,r:staff+").unwrap();
		assert_eq!(d.readable, set(&["owner", "staff", "admin", "system"]));
		assert_eq!(d.writeable, set(&["owner"]));

		let d = hier.parse("r:staff+").unwrap();
		assert_eq!(d.readable, set(&["staff", "admin", "system"]));
		assert!(d.writeable.is_empty());

		let d = hier.parse("r:owner+,w:staff+").unwrap();
		assert_eq!(d.readable, set(&["owner", "staff", "admin", "system"]));
		assert_eq!(d.writeable, set(&["staff", "admin", "system"]));
	}

	#[test]
	fn test_parse_all_none_and_default_targets() {
		let hier = AccessHierarchy::default();

		let d = hier.parse("all").unwrap();
		assert_eq!(d.readable, hier.all());
		assert_eq!(d.writeable, hier.all());

		let d = hier.parse("r:all,w:none").unwrap();
		assert_eq!(d.readable.len(), 6);
		assert!(d.writeable.is_empty());

		let d = hier.parse("").unwrap();
		assert_eq!(d, PermissionDirective::default());
	}

	#[test]
	fn test_parse_is_order_independent() {
		let hier = AccessHierarchy::default();
		let a = hier.parse("r:authenticated+, w:owner+, r:none").unwrap();
		let b = hier.parse("r:none,w:owner+,r:authenticated+").unwrap();
		assert_eq!(a, b);
		assert_eq!(a, hier.parse("r:authenticated+, w:owner+, r:none").unwrap());
	}

	#[test]
	fn test_plus_is_superset() {
		let hier = AccessHierarchy::default();
		for level in hier.levels() {
			let single = hier.resolve(level).unwrap();
			let plus = hier.resolve(&format!("{}+", level)).unwrap();
			assert!(single.is_subset(&plus));
			if level == "system" {
				assert_eq!(single, plus);
			} else {
				assert!(plus.len() > single.len());
			}
		}
	}

	#[test]
	fn test_undefined_level_is_config_error() {
		let hier = AccessHierarchy::default();
		assert!(matches!(hier.parse("r:wizard+"), Err(Error::ConfigError(_))));
		assert!(matches!(hier.parse("w:wizard"), Err(Error::ConfigError(_))));
		assert!(matches!(hier.parse("x:all"), Err(Error::ConfigError(_))));
		assert!(matches!(hier.parse(":all"), Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_reserved_and_duplicate_names_rejected() {
		assert!(AccessHierarchy::new(["anonymous", "all"]).is_err());
		assert!(AccessHierarchy::new(["none"]).is_err());
		assert!(AccessHierarchy::new(["a", "b", "a"]).is_err());
		assert!(AccessHierarchy::new(["a+"]).is_err());
		assert!(AccessHierarchy::new(Vec::<String>::new()).is_err());
		assert!(AccessHierarchy::new(["everyone", "nobody"]).is_ok());
	}

	#[test]
	fn test_level_set_access_classes() {
		assert_eq!(LevelSet::system().access_classes(), None);
		assert_eq!(LevelSet::new().access_classes(), None);
		assert_eq!(
			set(&["owner", "authenticated"]).access_classes().as_deref(),
			Some("authenticated, owner")
		);
		assert_eq!(
			set(&["system", "admin"]).access_classes().as_deref(),
			Some("admin, system")
		);
	}

	#[test]
	fn test_level_set_intersects() {
		assert!(set(&["owner"]).intersects(&set(&["owner", "staff"])));
		assert!(!set(&["anonymous"]).intersects(&set(&["owner", "staff"])));
		assert!(!LevelSet::new().intersects(&set(&["owner"])));
	}
}

// vim: ts=4
