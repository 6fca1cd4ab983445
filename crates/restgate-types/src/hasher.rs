//! Content hasher for entity validators. Capable of handling multiple versions.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

pub enum Hasher {
	V1(Sha256),
}

impl Hasher {
	pub fn new() -> Self {
		Self::V1(Sha256::new())
	}

	pub fn update(&mut self, data: &[u8]) {
		match self {
			Self::V1(hasher) => hasher.update(data),
		}
	}

	/// Produces `<prefix>-<base64 digest>` with base64 padding stripped.
	pub fn finalize(self, prefix: &str) -> String {
		match self {
			Self::V1(hasher) => {
				let mut out = String::with_capacity(prefix.len() + 44);
				out.push_str(prefix);
				out.push('-');
				STANDARD_NO_PAD.encode_string(hasher.finalize(), &mut out);
				out
			}
		}
	}
}

impl Default for Hasher {
	fn default() -> Self {
		Self::new()
	}
}

pub fn hash(prefix: &str, data: &[u8]) -> Box<str> {
	let mut hasher = Hasher::new();
	hasher.update(data);
	hasher.finalize(prefix).into()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_format() {
		let h = hash("json", b"{}");
		assert!(h.starts_with("json-"));
		assert!(!h.ends_with('='));
		// sha256 digest is 32 bytes -> 43 base64 chars without padding
		assert_eq!(h.len(), "json-".len() + 43);
	}

	#[test]
	fn test_hash_is_deterministic() {
		assert_eq!(hash("json", b"abc"), hash("json", b"abc"));
		assert_ne!(hash("json", b"abc"), hash("json", b"abd"));
		assert_ne!(hash("json", b"abc"), hash("yaml", b"abc"));
	}

	#[test]
	fn test_incremental_update() {
		let mut hasher = Hasher::new();
		hasher.update(b"ab");
		hasher.update(b"c");
		assert_eq!(hasher.finalize("raw").as_str(), hash("raw", b"abc").as_ref());
	}
}

// vim: ts=4
