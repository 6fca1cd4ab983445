//! Content negotiation
//!
//! `Accept` selects a serializer from an ordered registry, `Content-Type`
//! selects a deserializer for the request body.

use serde_json::Value;
use std::sync::Arc;

use crate::format::{Deserializer, Json, Serializer};
use crate::prelude::*;

/// Outcome of response format negotiation, fixed for the whole request.
#[derive(Debug, Clone)]
pub struct Negotiation {
	pub mime_type: Box<str>,
	pub serializer: Arc<dyn Serializer>,
}

/// One media range of an `Accept` header, quality in thousandths.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MediaRange<'a> {
	main: &'a str,
	sub: &'a str,
	quality: u16,
}

impl MediaRange<'_> {
	/// 0 for `*/*`, 1 for `type/*`, 2 for an exact type; `None` if no match.
	fn specificity(&self, main: &str, sub: &str) -> Option<u8> {
		if self.main == "*" {
			Some(0)
		} else if !self.main.eq_ignore_ascii_case(main) {
			None
		} else if self.sub == "*" {
			Some(1)
		} else if self.sub.eq_ignore_ascii_case(sub) {
			Some(2)
		} else {
			None
		}
	}
}

/// Parse a `q` parameter value into thousandths. Invalid values yield `None`.
fn parse_quality(value: &str) -> Option<u16> {
	let value = value.trim();
	let (int, frac) = value.split_once('.').unwrap_or((value, ""));
	if frac.len() > 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	let thousandths: u16 =
		frac.bytes().zip([100, 10, 1]).map(|(digit, weight)| u16::from(digit - b'0') * weight).sum();
	match int {
		"0" => Some(thousandths),
		"1" if thousandths == 0 => Some(1000),
		_ => None,
	}
}

fn parse_accept(accept: &str) -> Vec<MediaRange<'_>> {
	accept
		.split(',')
		.filter_map(|item| {
			let mut parts = item.split(';');
			let media = parts.next()?.trim();
			if media.is_empty() {
				return None;
			}
			let (main, sub) = if media == "*" { ("*", "*") } else { media.split_once('/')? };
			let mut quality = 1000;
			for param in parts {
				if let Some((key, value)) = param.split_once('=') {
					if key.trim().eq_ignore_ascii_case("q") {
						quality = parse_quality(value)?;
					}
				}
			}
			Some(MediaRange { main: main.trim(), sub: sub.trim(), quality })
		})
		.collect()
}

// SerializerRegistry //
//********************//
/// Serializers keyed by MIME type, in order of preference.
#[derive(Debug, Clone, Default)]
pub struct SerializerRegistry {
	entries: Vec<(Box<str>, Arc<dyn Serializer>)>,
}

impl SerializerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `serializer` for `mime_type`. A later registration of the same
	/// MIME type replaces the earlier one but keeps its position.
	pub fn register(&mut self, mime_type: &str, serializer: Arc<dyn Serializer>) {
		let mime_type = mime_type.to_ascii_lowercase();
		if let Some(entry) = self.entries.iter_mut().find(|(m, _)| **m == *mime_type) {
			entry.1 = serializer;
		} else {
			self.entries.push((mime_type.into(), serializer));
		}
	}

	pub fn with(mut self, mime_type: &str, serializer: Arc<dyn Serializer>) -> Self {
		self.register(mime_type, serializer);
		self
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn mime_types(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(m, _)| &**m)
	}

	/// Pick the serializer for an `Accept` header value.
	///
	/// A missing header accepts anything. Offers are ranked by the quality of
	/// the most specific media range they match, then by that range's
	/// specificity; remaining ties go to registration order.
	pub fn negotiate(&self, accept: Option<&str>) -> RgResult<Negotiation> {
		if self.entries.is_empty() {
			return Err(Error::MisconfiguredServer("no serializers registered".into()));
		}

		let ranges = parse_accept(accept.unwrap_or("*/*"));
		let mut best: Option<((u16, u8), usize)> = None;

		for (idx, (mime_type, _)) in self.entries.iter().enumerate() {
			let Some((main, sub)) = mime_type.split_once('/') else {
				continue;
			};
			let matched = ranges
				.iter()
				.filter_map(|range| range.specificity(main, sub).map(|spec| (spec, range.quality)))
				.max_by_key(|(spec, _)| *spec);
			let Some((spec, quality)) = matched else {
				continue;
			};
			if quality == 0 {
				continue;
			}
			let rank = (quality, spec);
			if best.is_none_or(|(best_rank, _)| rank > best_rank) {
				best = Some((rank, idx));
			}
		}

		match best.and_then(|(_, idx)| self.entries.get(idx)) {
			Some((mime_type, serializer)) => {
				Ok(Negotiation { mime_type: mime_type.clone(), serializer: serializer.clone() })
			}
			None => {
				debug!(accept = ?accept, "no acceptable serializer");
				Err(Error::NotAcceptable(format!(
					"Supported content types: {}",
					self.mime_types().collect::<Vec<_>>().join(", ")
				)))
			}
		}
	}
}

// DeserializerRegistry //
//**********************//
#[derive(Debug, Clone, Default)]
pub struct DeserializerRegistry {
	entries: Vec<Arc<dyn Deserializer>>,
}

/// Media type of a `Content-Type` value: parameters stripped, lowercase.
pub fn media_type(content_type: &str) -> String {
	content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

impl DeserializerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, deserializer: Arc<dyn Deserializer>) {
		self.entries.push(deserializer);
	}

	pub fn with(mut self, deserializer: Arc<dyn Deserializer>) -> Self {
		self.register(deserializer);
		self
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn lookup(&self, content_type: &str) -> Option<&Arc<dyn Deserializer>> {
		let media = media_type(content_type);
		self.entries.iter().find(|d| d.mime_types().contains(&media.as_str()))
	}

	/// Deserializer for a request body.
	///
	/// An empty body, or an empty registry, needs no deserializer. Otherwise
	/// the content type must be declared by a registered deserializer.
	pub fn select(
		&self,
		content_type: Option<&str>,
		body: &[u8],
	) -> RgResult<Option<Arc<dyn Deserializer>>> {
		if body.is_empty() || self.entries.is_empty() {
			return Ok(None);
		}
		match content_type.and_then(|ct| self.lookup(ct)) {
			Some(deserializer) => Ok(Some(deserializer.clone())),
			None => {
				debug!(content_type = ?content_type, "unsupported request content type");
				Err(Error::UnsupportedMediaType(format!(
					"Unsupported content type: {}",
					content_type.unwrap_or("(none)")
				)))
			}
		}
	}

	/// Decode a request body, `None` when there is nothing to decode.
	pub fn decode(&self, content_type: Option<&str>, body: &[u8]) -> RgResult<Option<Value>> {
		match self.select(content_type, body)? {
			Some(deserializer) => deserializer.deserialize(body).map(Some),
			None => Ok(None),
		}
	}

	/// Literal grammar for query values: the request format's when it is
	/// registered, JSON otherwise.
	pub fn literal_grammar(&self, content_type: Option<&str>) -> Arc<dyn Deserializer> {
		content_type
			.and_then(|ct| self.lookup(ct))
			.cloned()
			.unwrap_or_else(|| Arc::new(Json) as Arc<dyn Deserializer>)
	}
}

/// Method to dispatch on. `X-HTTP-Method-Override` is honoured for POST only.
pub fn effective_method(method: &str, method_override: Option<&str>) -> String {
	match method_override.map(str::trim) {
		Some(over) if method.eq_ignore_ascii_case("POST") && !over.is_empty() => {
			over.to_ascii_uppercase()
		}
		_ => method.to_ascii_uppercase(),
	}
}


// vim: ts=4
