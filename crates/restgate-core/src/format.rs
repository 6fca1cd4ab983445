//! Wire formats
//!
//! A serializer turns a response value into bytes; a deserializer decodes a
//! request body and also supplies the literal grammar used for query filter
//! values. Formats are pluggable: register anything implementing these traits.

use serde_json::Value;
use std::fmt::Debug;

use crate::prelude::*;

pub trait Serializer: Debug + Send + Sync {
	/// Short format name, used as the ETag prefix.
	fn name(&self) -> &str;

	fn serialize(&self, value: &Value) -> RgResult<Vec<u8>>;
}

pub trait Deserializer: Debug + Send + Sync {
	/// Content types this deserializer accepts, lowercase, without parameters.
	fn mime_types(&self) -> &[&'static str];

	/// Decode a request body. A body that does not parse in this format is
	/// `UnsupportedMediaType`.
	fn deserialize(&self, body: &[u8]) -> RgResult<Value>;

	/// Parse a single scalar literal, `None` when it is not valid in this format.
	fn parse_literal(&self, literal: &str) -> Option<Value>;
}

// Json //
//******//
pub const JSON_MIME_TYPES: &[&str] = &[
	"application/json",
	"application/x-javascript",
	"text/javascript",
	"text/x-javascript",
	"text/x-json",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Serializer for Json {
	fn name(&self) -> &str {
		"json"
	}

	fn serialize(&self, value: &Value) -> RgResult<Vec<u8>> {
		Ok(serde_json::to_vec(value)?)
	}
}

impl Deserializer for Json {
	fn mime_types(&self) -> &[&'static str] {
		JSON_MIME_TYPES
	}

	fn deserialize(&self, body: &[u8]) -> RgResult<Value> {
		serde_json::from_slice(body)
			.map_err(|err| Error::UnsupportedMediaType(format!("Invalid JSON body: {}", err)))
	}

	fn parse_literal(&self, literal: &str) -> Option<Value> {
		serde_json::from_str(literal).ok()
	}
}

// Yaml //
//******//
pub const YAML_MIME_TYPES: &[&str] = &["application/x-yaml", "text/yaml", "application/yaml"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml;

impl Serializer for Yaml {
	fn name(&self) -> &str {
		"yaml"
	}

	fn serialize(&self, value: &Value) -> RgResult<Vec<u8>> {
		Ok(serde_yaml::to_string(value)?.into_bytes())
	}
}

impl Deserializer for Yaml {
	fn mime_types(&self) -> &[&'static str] {
		YAML_MIME_TYPES
	}

	fn deserialize(&self, body: &[u8]) -> RgResult<Value> {
		serde_yaml::from_slice(body)
			.map_err(|err| Error::UnsupportedMediaType(format!("Invalid YAML body: {}", err)))
	}

	fn parse_literal(&self, literal: &str) -> Option<Value> {
		serde_yaml::from_str(literal).ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_json_literals() {
		assert_eq!(Json.parse_literal("42"), Some(json!(42)));
		assert_eq!(Json.parse_literal("true"), Some(json!(true)));
		assert_eq!(Json.parse_literal("null"), Some(Value::Null));
		assert_eq!(Json.parse_literal("\"spam\""), Some(json!("spam")));
		assert_eq!(Json.parse_literal("spam"), None);
	}

	#[test]
	fn test_yaml_literals() {
		assert_eq!(Yaml.parse_literal("42"), Some(json!(42)));
		assert_eq!(Yaml.parse_literal("false"), Some(json!(false)));
		assert_eq!(Yaml.parse_literal("spam"), Some(json!("spam")));
	}

	#[test]
	fn test_undecodable_bodies_are_unsupported() {
		assert!(matches!(Json.deserialize(b"{nope"), Err(Error::UnsupportedMediaType(_))));
		assert_eq!(Json.deserialize(br#"{"a":1}"#).unwrap(), json!({"a": 1}));
		assert!(matches!(Yaml.deserialize(b"a: [1"), Err(Error::UnsupportedMediaType(_))));
	}

	#[test]
	fn test_yaml_serialize() {
		let bytes = Yaml.serialize(&json!({"username": "spam"})).unwrap();
		assert_eq!(String::from_utf8(bytes).unwrap().trim(), "username: spam");
	}
}

// vim: ts=4
