//! Record matching, comparison and windowing helpers

use serde_json::Value;
use std::cmp::Ordering;

use restgate_types::types::{FilterClause, FilterOp, ListQuery, Record, SortField};

/// Check a record against every clause. Missing fields only satisfy `ne`.
pub fn matches_criteria(record: &Record, criteria: &[FilterClause]) -> bool {
	criteria.iter().all(|clause| matches_clause(record, clause))
}

pub fn matches_clause(record: &Record, clause: &FilterClause) -> bool {
	let Some(actual) = record.get(&*clause.field) else {
		return clause.op == FilterOp::Ne;
	};
	match clause.op {
		FilterOp::Eq => actual == &clause.value,
		FilterOp::Ne => actual != &clause.value,
		op => {
			// Ordering across JSON types is meaningless, so it never matches
			if !same_kind(actual, &clause.value) {
				return false;
			}
			let ord = compare_values(Some(actual), Some(&clause.value));
			match op {
				FilterOp::Lt => ord == Ordering::Less,
				FilterOp::Le => ord != Ordering::Greater,
				FilterOp::Gt => ord == Ordering::Greater,
				FilterOp::Ge => ord != Ordering::Less,
				FilterOp::Eq | FilterOp::Ne => false,
			}
		}
	}
}

fn same_kind(a: &Value, b: &Value) -> bool {
	matches!(
		(a, b),
		(Value::Number(_), Value::Number(_))
			| (Value::String(_), Value::String(_))
			| (Value::Bool(_), Value::Bool(_))
	)
}

/// Compare two JSON values for sorting
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
	match (a, b) {
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Less,
		(Some(_), None) => Ordering::Greater,
		(Some(Value::Number(a)), Some(Value::Number(b))) => {
			a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal)
		}
		(Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
		(Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
		(Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
	}
}

/// Compare two records by a list of sort fields
pub fn compare_records(a: &Record, b: &Record, sort_fields: &[SortField]) -> Ordering {
	for field in sort_fields {
		let ord = compare_values(a.get(&*field.field), b.get(&*field.field));
		let ord = if field.ascending { ord } else { ord.reverse() };
		if ord != Ordering::Equal {
			return ord;
		}
	}
	Ordering::Equal
}

/// Filter, sort and window `records` according to `query`.
pub fn apply_query<'a>(records: impl Iterator<Item = &'a Record>, query: &ListQuery) -> Vec<Record> {
	let mut matched: Vec<&Record> =
		records.filter(|record| matches_criteria(record, &query.criteria)).collect();

	if !query.order.is_empty() {
		matched.sort_by(|a, b| compare_records(a, b, &query.order));
	}

	let start = usize::try_from(query.offset).unwrap_or(usize::MAX);
	let limit = query.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
	matched.into_iter().skip(start).take(limit).cloned().collect()
}

// vim: ts=4
