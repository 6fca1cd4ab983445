//! Resource handlers
//!
//! Per request: check the method, negotiate, decode the body, fetch, resolve
//! the caller's levels, compute and check the ETag, then mutate or serialize.

use axum::{
	body::Bytes,
	extract::{Path, State},
	http::{
		header::{ACCEPT, CONTENT_TYPE, IF_MATCH, IF_NONE_MATCH, RANGE},
		HeaderMap, Method, StatusCode, Uri,
	},
	response::Response,
	Extension,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use restgate_core::{filter, ConditionalCoordinator, EntityTag, PartialUpdateProcessor, RangeWindow};
use restgate_types::types::{FilterClause, ListQuery};

use crate::app::Resource;
use crate::extract::Caller;
use crate::prelude::*;
use crate::response;

type PathParams = Option<Path<HashMap<String, String>>>;

fn header_str<'a>(headers: &'a HeaderMap, name: axum::http::HeaderName) -> Option<&'a str> {
	headers.get(name).and_then(|v| v.to_str().ok())
}

/// Route parameters are strings; numbers and booleans are matched as such.
fn path_literal(raw: &str) -> Value {
	match serde_json::from_str::<Value>(raw) {
		Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
		_ => Value::String(raw.to_string()),
	}
}

/// Equality criteria selecting the records a route addresses.
fn scope_criteria(resource: &Resource, params: PathParams) -> RgResult<Vec<FilterClause>> {
	let params = params.map(|Path(params)| params).unwrap_or_default();
	resource
		.scope
		.iter()
		.map(|(param, field)| {
			let raw = params.get(&**param).ok_or_else(|| {
				Error::MisconfiguredServer(format!("route parameter '{}' missing", param))
			})?;
			Ok(FilterClause::eq(field.clone(), path_literal(raw)))
		})
		.collect()
}

fn is_read(method: &Method) -> bool {
	method == Method::GET || method == Method::HEAD
}

/// GET, HEAD and PATCH on a single record.
pub async fn item(
	State(app): State<App>,
	Extension(resource): Extension<Arc<Resource>>,
	Caller(subject): Caller,
	method: Method,
	params: PathParams,
	headers: HeaderMap,
	body: Bytes,
) -> RgResult<Response> {
	if !is_read(&method) && method != Method::PATCH {
		debug!(entity = %resource.entity, method = %method, "method not allowed");
		return Err(Error::MethodNotAllowed);
	}

	let negotiation = app.serializers.negotiate(header_str(&headers, ACCEPT))?;
	let patch = app.deserializers.decode(header_str(&headers, CONTENT_TYPE), &body)?;

	let entity = app.entity(&resource.entity)?;
	let criteria = scope_criteria(&resource, params)?;
	let mut record = app.store.fetch_one(&entity.name, &criteria).await?;
	let levels = entity.instance_levels(&record, &subject);

	// The tag covers what this caller may read, for reads and mutations alike
	let view = Value::Object(entity.policy.project(&record, &levels));
	let content = negotiation.serializer.serialize(&view)?;
	let etag = EntityTag::from_content(negotiation.serializer.name(), &content);

	let mut conditional = ConditionalCoordinator::new(
		method.as_str(),
		header_str(&headers, IF_MATCH),
		header_str(&headers, IF_NONE_MATCH),
	)
	.require_if_match(app.settings.require_if_match);

	if is_read(&method) {
		match conditional.check(etag.clone()) {
			Err(Error::NotModified) => return Ok(response::not_modified(&etag)),
			result => result?,
		}
		let mut res = response::content(StatusCode::OK, &negotiation, content);
		if let Some(etag) = conditional.finish() {
			response::set_etag(res.headers_mut(), &etag);
		}
		response::set_access_classes(res.headers_mut(), &levels);
		return Ok(res);
	}

	if let Err(err) = conditional.check(etag) {
		warn!(entity = %entity.name, status = err.status().as_u16(), "precondition rejected");
		return Err(err);
	}
	let applied =
		PartialUpdateProcessor::apply(&mut record, patch.as_ref(), &entity.policy, &levels)
			.inspect_err(|err| {
				warn!(entity = %entity.name, error = %err, "patch rejected");
			})?;
	app.store.save(&entity.name, &entity.key_field, &record).await.map_err(|err| {
		error!(entity = %entity.name, error = %err, "save failed");
		Error::DbError
	})?;
	conditional.finish();
	info!(entity = %entity.name, fields = ?applied.fields, "record updated");

	Ok(response::no_content())
}

/// GET and HEAD on a filtered, ordered window of records.
#[allow(clippy::too_many_arguments)]
pub async fn collection(
	State(app): State<App>,
	Extension(resource): Extension<Arc<Resource>>,
	Caller(subject): Caller,
	method: Method,
	params: PathParams,
	uri: Uri,
	headers: HeaderMap,
	body: Bytes,
) -> RgResult<Response> {
	if !is_read(&method) {
		debug!(entity = %resource.entity, method = %method, "method not allowed");
		return Err(Error::MethodNotAllowed);
	}

	let negotiation = app.serializers.negotiate(header_str(&headers, ACCEPT))?;
	let content_type = header_str(&headers, CONTENT_TYPE);
	app.deserializers.select(content_type, &body)?;

	let entity = app.entity(&resource.entity)?;
	let mut criteria = scope_criteria(&resource, params)?;

	let class_levels = entity.class_levels(&subject);
	let query: Vec<(String, String)> = serde_urlencoded::from_str(uri.query().unwrap_or_default())
		.map_err(|err| Error::BadRequest(format!("Invalid query string: {}", err)))?;
	let grammar = app.deserializers.literal_grammar(content_type);
	criteria.extend(filter::compile(&query, &entity.policy, &class_levels, grammar.as_ref()));

	let window = RangeWindow::plan(
		header_str(&headers, RANGE),
		app.settings.max_limit,
		app.settings.default_limit(),
	)
	.inspect_err(|err| debug!(entity = %entity.name, error = %err, "range rejected"))?;

	let list_query = ListQuery {
		criteria,
		order: entity.sort_fields(),
		offset: window.offset,
		limit: Some(window.limit),
	};
	let records = app.store.fetch_many(&entity.name, &list_query).await?;

	let items: Vec<Value> = records
		.iter()
		.map(|record| {
			let levels = entity.instance_levels(record, &subject);
			Value::Object(entity.policy.project(record, &levels))
		})
		.collect();
	let returned = items.len() as u64;
	let content = negotiation.serializer.serialize(&Value::Array(items))?;
	let etag = EntityTag::from_content(negotiation.serializer.name(), &content);

	let mut conditional =
		ConditionalCoordinator::new(method.as_str(), None, header_str(&headers, IF_NONE_MATCH));
	match conditional.check(etag.clone()) {
		Err(Error::NotModified) => return Ok(response::not_modified(&etag)),
		result => result?,
	}

	let status = if window.partial { StatusCode::PARTIAL_CONTENT } else { StatusCode::OK };
	let mut res = response::content(status, &negotiation, content);
	if window.partial {
		let total = app.store.count(&entity.name, &list_query.criteria).await?;
		response::set_content_range(res.headers_mut(), &window.content_range(returned, total));
	}
	if let Some(etag) = conditional.finish() {
		response::set_etag(res.headers_mut(), &etag);
	}
	Ok(res)
}

pub async fn not_found() -> Error {
	Error::NotFound
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_path_literal() {
		assert_eq!(path_literal("12"), json!(12));
		assert_eq!(path_literal("true"), json!(true));
		assert_eq!(path_literal("spam"), json!("spam"));
		assert_eq!(path_literal("null"), json!("null"));
		assert_eq!(path_literal("[1]"), json!("[1]"));
	}
}

// vim: ts=4
