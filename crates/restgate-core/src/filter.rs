//! Query string filters
//!
//! `?field=value` becomes an equality clause; a 3-character prefix picks
//! another operator (`?age=ge:18`). Only fields readable at class level take
//! part, so filters cannot probe hidden values.

use serde_json::Value;

use restgate_types::types::{FilterClause, FilterOp};

use crate::access::LevelSet;
use crate::format::Deserializer;
use crate::policy::FieldAccessPolicy;
use crate::prelude::*;

/// Split an optional operator prefix off a raw query value.
fn split_operator(raw: &str) -> (FilterOp, &str) {
	match raw.get(..3).and_then(FilterOp::from_prefix) {
		Some(op) => (op, &raw[3..]),
		None => (FilterOp::Eq, raw),
	}
}

/// Parse a literal with `grammar`; containers and parse failures fall back to
/// the raw string.
fn decode_literal(literal: &str, grammar: &dyn Deserializer) -> Value {
	match grammar.parse_literal(literal) {
		Some(Value::Array(_) | Value::Object(_)) | None => Value::String(literal.to_string()),
		Some(value) => value,
	}
}

/// Compile query parameters into clauses for the fields readable by `levels`.
///
/// Parameters naming other fields are ignored. Repeated parameters yield one
/// clause each; all clauses are ANDed.
pub fn compile(
	params: &[(String, String)],
	policy: &FieldAccessPolicy,
	levels: &LevelSet,
	grammar: &dyn Deserializer,
) -> Vec<FilterClause> {
	let mut clauses = Vec::new();
	for (name, raw) in params {
		if !policy.is_readable(name, levels) {
			debug!(param = %name, "ignoring query parameter");
			continue;
		}
		let (op, literal) = split_operator(raw);
		clauses.push(FilterClause::new(name.as_str(), op, decode_literal(literal, grammar)));
	}
	clauses
}


// vim: ts=4
