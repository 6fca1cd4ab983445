//! Gate settings
//!
//! Loaded from YAML or built in code, optionally overridden from the
//! environment, and validated once before the registries are built.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::access::{AccessHierarchy, DEFAULT_ACCESS_HIERARCHY};
use crate::format::{Deserializer, JSON_MIME_TYPES, Json, Serializer, YAML_MIME_TYPES, Yaml};
use crate::negotiate::{DeserializerRegistry, SerializerRegistry};
use crate::prelude::*;

pub const DEFAULT_MAX_LIMIT: u64 = 50;
pub const ENV_MAX_LIMIT: &str = "RESTGATE_MAX_LIMIT";
pub const ENV_DEFAULT_LIMIT: &str = "RESTGATE_DEFAULT_LIMIT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateSettings {
	/// Largest window a `Range` request may ask for
	pub max_limit: u64,
	/// Window size without a `Range` header; `max_limit` when unset
	pub default_limit: Option<u64>,
	/// Access levels, lowest to highest
	pub hierarchy: Vec<String>,
	/// Response MIME types in order of preference
	pub serializers: Vec<String>,
	/// Request body formats by name (`json`, `yaml`)
	pub deserializers: Vec<String>,
	/// Reject mutations that carry no `If-Match`
	pub require_if_match: bool,
}

impl Default for GateSettings {
	fn default() -> Self {
		Self {
			max_limit: DEFAULT_MAX_LIMIT,
			default_limit: None,
			hierarchy: DEFAULT_ACCESS_HIERARCHY.iter().map(ToString::to_string).collect(),
			serializers: vec!["application/json".into(), "text/json".into()],
			deserializers: vec!["json".into()],
			require_if_match: true,
		}
	}
}

fn serializer_for(mime_type: &str) -> Option<Arc<dyn Serializer>> {
	let mime_type = mime_type.to_ascii_lowercase();
	if JSON_MIME_TYPES.contains(&mime_type.as_str()) || mime_type == "text/json" {
		Some(Arc::new(Json))
	} else if YAML_MIME_TYPES.contains(&mime_type.as_str()) {
		Some(Arc::new(Yaml))
	} else {
		None
	}
}

fn deserializer_for(name: &str) -> Option<Arc<dyn Deserializer>> {
	match name {
		"json" => Some(Arc::new(Json)),
		"yaml" => Some(Arc::new(Yaml)),
		_ => None,
	}
}

impl GateSettings {
	pub fn from_yaml(text: &str) -> RgResult<Self> {
		let settings: Self = serde_yaml::from_str(text)
			.map_err(|err| Error::ConfigError(format!("invalid settings: {}", err)))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Apply `RESTGATE_MAX_LIMIT` and `RESTGATE_DEFAULT_LIMIT` from the process
	/// environment.
	pub fn with_env_overrides(self) -> RgResult<Self> {
		self.with_overrides_from(|key| std::env::var(key).ok())
	}

	pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> RgResult<Self> {
		let parse = |key: &str, value: String| {
			value.trim().parse::<u64>().map_err(|_| {
				Error::ConfigError(format!("{} must be a positive integer, got '{}'", key, value))
			})
		};
		if let Some(value) = lookup(ENV_MAX_LIMIT) {
			self.max_limit = parse(ENV_MAX_LIMIT, value)?;
		}
		if let Some(value) = lookup(ENV_DEFAULT_LIMIT) {
			self.default_limit = Some(parse(ENV_DEFAULT_LIMIT, value)?);
		}
		self.validate()?;
		Ok(self)
	}

	pub fn default_limit(&self) -> u64 {
		self.default_limit.unwrap_or(self.max_limit)
	}

	pub fn validate(&self) -> RgResult<()> {
		if self.max_limit == 0 {
			return Err(Error::ConfigError("max_limit must be greater than 0".into()));
		}
		match self.default_limit {
			Some(0) => return Err(Error::ConfigError("default_limit must be greater than 0".into())),
			Some(limit) if limit > self.max_limit => {
				return Err(Error::ConfigError(format!(
					"default_limit ({}) exceeds max_limit ({})",
					limit, self.max_limit
				)));
			}
			_ => (),
		}
		self.hierarchy()?;
		if self.serializers.is_empty() {
			return Err(Error::ConfigError("at least one serializer is required".into()));
		}
		if let Some(unknown) = self.serializers.iter().find(|m| serializer_for(m).is_none()) {
			return Err(Error::ConfigError(format!("no serializer for '{}'", unknown)));
		}
		if let Some(unknown) = self.deserializers.iter().find(|n| deserializer_for(n).is_none()) {
			return Err(Error::ConfigError(format!("unknown request format '{}'", unknown)));
		}
		Ok(())
	}

	pub fn hierarchy(&self) -> RgResult<AccessHierarchy> {
		AccessHierarchy::new(self.hierarchy.iter().map(String::as_str))
	}

	pub fn serializer_registry(&self) -> RgResult<SerializerRegistry> {
		let mut registry = SerializerRegistry::new();
		for mime_type in &self.serializers {
			let serializer = serializer_for(mime_type)
				.ok_or_else(|| Error::ConfigError(format!("no serializer for '{}'", mime_type)))?;
			registry.register(mime_type, serializer);
		}
		Ok(registry)
	}

	pub fn deserializer_registry(&self) -> RgResult<DeserializerRegistry> {
		let mut registry = DeserializerRegistry::new();
		for name in &self.deserializers {
			let deserializer = deserializer_for(name)
				.ok_or_else(|| Error::ConfigError(format!("unknown request format '{}'", name)))?;
			registry.register(deserializer);
		}
		Ok(registry)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let settings = GateSettings::default();
		settings.validate().unwrap();
		assert_eq!(settings.max_limit, 50);
		assert_eq!(settings.default_limit(), 50);
		assert!(settings.require_if_match);
		let registry = settings.serializer_registry().unwrap();
		assert_eq!(registry.mime_types().collect::<Vec<_>>(), vec!["application/json", "text/json"]);
	}

	#[test]
	fn test_from_yaml() {
		let settings = GateSettings::from_yaml(
			"max_limit: 20\ndefault_limit: 10\nserializers: [application/json, application/x-yaml]\ndeserializers: [json, yaml]\n",
		)
		.unwrap();
		assert_eq!(settings.max_limit, 20);
		assert_eq!(settings.default_limit(), 10);
		assert_eq!(settings.hierarchy, GateSettings::default().hierarchy);
		let neg = settings.serializer_registry().unwrap().negotiate(Some("application/x-yaml")).unwrap();
		assert_eq!(neg.serializer.name(), "yaml");
	}

	#[test]
	fn test_invalid_settings() {
		assert!(GateSettings::from_yaml("max_limit: 0").is_err());
		assert!(GateSettings::from_yaml("max_limit: 10\ndefault_limit: 20").is_err());
		assert!(GateSettings::from_yaml("hierarchy: [anonymous, all]").is_err());
		assert!(GateSettings::from_yaml("serializers: [text/html]").is_err());
		assert!(GateSettings::from_yaml("deserializers: [xml]").is_err());
		assert!(GateSettings::from_yaml("colour: blue").is_err());
	}

	#[test]
	fn test_overrides() {
		let settings = GateSettings::default()
			.with_overrides_from(|key| match key {
				ENV_MAX_LIMIT => Some("100".into()),
				ENV_DEFAULT_LIMIT => Some("25".into()),
				_ => None,
			})
			.unwrap();
		assert_eq!(settings.max_limit, 100);
		assert_eq!(settings.default_limit(), 25);

		let err = GateSettings::default()
			.with_overrides_from(|key| (key == ENV_MAX_LIMIT).then(|| "lots".to_string()))
			.unwrap_err();
		assert!(matches!(err, Error::ConfigError(_)));
	}
}

// vim: ts=4
