//! Partial updates
//!
//! A patch is validated as a whole before anything is assigned, so a rejected
//! patch leaves the record untouched.

use serde_json::Value;

use crate::access::LevelSet;
use crate::policy::FieldAccessPolicy;
use crate::prelude::*;

/// Fields a patch assigned, in patch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedPatch {
	pub fields: Vec<Box<str>>,
}

impl AppliedPatch {
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

/// Quote printable field names, debug-escape the rest.
fn display_name(name: &str) -> String {
	if name.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
		format!("\"{}\"", name)
	} else {
		format!("{:?}", name)
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PartialUpdateProcessor;

impl PartialUpdateProcessor {
	/// Check every key of `patch` against `policy` for `levels`.
	///
	/// `None` is an empty patch. Anything but an object is rejected.
	pub fn validate<'a>(
		patch: Option<&'a Value>,
		policy: &FieldAccessPolicy,
		levels: &LevelSet,
	) -> RgResult<Vec<(&'a str, &'a Value)>> {
		let entries = match patch {
			None => return Ok(Vec::new()),
			Some(Value::Object(map)) => map,
			Some(_) => {
				return Err(Error::UnprocessableEntity("Patch body must be an object".into()));
			}
		};

		let mut accepted = Vec::with_capacity(entries.len());
		for (name, value) in entries {
			if !policy.contains(name) {
				debug!(field = %name, "patch names unknown field");
				return Err(Error::UnprocessableEntity(format!(
					"No such attribute: {}",
					display_name(name)
				)));
			}
			if !policy.is_writeable(name, levels) {
				debug!(field = %name, levels = %levels, "patch names unwritable field");
				return Err(Error::UnprocessableEntity(format!(
					"Attribute {} is not writeable",
					display_name(name)
				)));
			}
			accepted.push((name.as_str(), value));
		}
		Ok(accepted)
	}

	/// Validate `patch` and, only if every field passes, assign it to `record`.
	pub fn apply(
		record: &mut Record,
		patch: Option<&Value>,
		policy: &FieldAccessPolicy,
		levels: &LevelSet,
	) -> RgResult<AppliedPatch> {
		let accepted = Self::validate(patch, policy, levels)?;

		let mut applied = AppliedPatch::default();
		for (name, value) in accepted {
			record.insert(name.to_string(), value.clone());
			applied.fields.push(name.into());
		}
		Ok(applied)
	}
}


// vim: ts=4
