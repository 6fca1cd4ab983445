//! Response assembly helpers

use axum::http::header::{CONTENT_TYPE, ETAG, VARY};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use restgate_core::{ContentRange, EntityTag, LevelSet, Negotiation};

/// Request headers every negotiated response depends on
pub const VARY_ON: &[&str] = &["Accept", "Accept-Encoding"];

pub const X_ACCESS_CLASSES: HeaderName = HeaderName::from_static("x-access-classes");
pub const X_HTTP_METHOD_OVERRIDE: HeaderName = HeaderName::from_static("x-http-method-override");

/// Add `names` to the `Vary` header unless already listed (case-insensitive).
///
/// A single existing `Vary` header is extended in place; otherwise another
/// header line is added.
pub fn append_vary(headers: &mut HeaderMap, names: &[&str]) {
	for name in names {
		let existing: Vec<String> = headers
			.get_all(VARY)
			.iter()
			.filter_map(|v| v.to_str().ok())
			.map(str::to_string)
			.collect();
		let listed = existing
			.iter()
			.flat_map(|value| value.split(','))
			.any(|listed| listed.trim().eq_ignore_ascii_case(name));
		if listed {
			continue;
		}

		match existing.as_slice() {
			[single] => {
				if let Ok(value) = HeaderValue::from_str(&format!("{}, {}", single, name)) {
					headers.insert(VARY, value);
				}
			}
			_ => {
				if let Ok(value) = HeaderValue::from_str(name) {
					headers.append(VARY, value);
				}
			}
		}
	}
}

pub fn set_etag(headers: &mut HeaderMap, etag: &EntityTag) {
	if let Ok(value) = HeaderValue::from_str(&etag.to_string()) {
		headers.insert(ETAG, value);
	}
}

pub fn set_access_classes(headers: &mut HeaderMap, levels: &LevelSet) {
	if let Some(value) = levels.access_classes().and_then(|c| HeaderValue::from_str(&c).ok()) {
		headers.insert(X_ACCESS_CLASSES, value);
	}
}

pub fn set_content_range(headers: &mut HeaderMap, range: &ContentRange) {
	if let Ok(value) = HeaderValue::from_str(&range.to_string()) {
		headers.insert(axum::http::header::CONTENT_RANGE, value);
	}
}

/// Serialized body with the negotiated content type.
pub fn content(status: StatusCode, negotiation: &Negotiation, body: Vec<u8>) -> Response {
	let mut response = (status, body).into_response();
	if let Ok(value) = HeaderValue::from_str(&negotiation.mime_type) {
		response.headers_mut().insert(CONTENT_TYPE, value);
	}
	response
}

/// `304 Not Modified`: no body, but the validator is repeated.
pub fn not_modified(etag: &EntityTag) -> Response {
	let mut response = StatusCode::NOT_MODIFIED.into_response();
	set_etag(response.headers_mut(), etag);
	response
}

/// `204 No Content` after a successful mutation.
pub fn no_content() -> Response {
	StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn vary(headers: &HeaderMap) -> Vec<&str> {
		headers.get_all(VARY).iter().filter_map(|v| v.to_str().ok()).collect()
	}

	#[test]
	fn test_append_vary_to_empty() {
		let mut headers = HeaderMap::new();
		append_vary(&mut headers, VARY_ON);
		assert_eq!(vary(&headers), vec!["Accept, Accept-Encoding"]);
	}

	#[test]
	fn test_append_vary_merges_case_insensitively() {
		let mut headers = HeaderMap::new();
		headers.insert(VARY, HeaderValue::from_static("accept, Cookie"));
		append_vary(&mut headers, VARY_ON);
		assert_eq!(vary(&headers), vec!["accept, Cookie, Accept-Encoding"]);
	}

	#[test]
	fn test_append_vary_with_multiple_lines() {
		let mut headers = HeaderMap::new();
		headers.append(VARY, HeaderValue::from_static("Cookie"));
		headers.append(VARY, HeaderValue::from_static("Origin"));
		append_vary(&mut headers, &["Accept"]);
		assert_eq!(vary(&headers), vec!["Cookie", "Origin", "Accept"]);
	}

	#[test]
	fn test_access_classes_header() {
		let mut headers = HeaderMap::new();
		set_access_classes(&mut headers, &LevelSet::system());
		assert!(headers.get(X_ACCESS_CLASSES).is_none());

		let levels: LevelSet = ["owner", "authenticated"].into_iter().collect();
		set_access_classes(&mut headers, &levels);
		assert_eq!(headers[X_ACCESS_CLASSES], "authenticated, owner");
	}
}

// vim: ts=4
