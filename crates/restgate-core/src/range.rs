//! Range pagination over item numbers
//!
//! `Range: items=a-b` selects records `a` up to, but not including, `b`.

use std::fmt;

use crate::prelude::*;

pub const RANGE_UNIT: &str = "items";

/// Offset and size of the window to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
	pub offset: u64,
	pub limit: u64,
	/// A `Range` header was sent, so the response is `206 Partial Content`.
	pub partial: bool,
}

impl RangeWindow {
	/// Plan the window for an optional `Range` header value.
	pub fn plan(header: Option<&str>, max_limit: u64, default_limit: u64) -> RgResult<Self> {
		let Some(header) = header else {
			return Ok(Self { offset: 0, limit: default_limit.min(max_limit), partial: false });
		};

		let reject = |msg: String| {
			debug!(range = %header, reason = %msg, "range rejected");
			Err(Error::RangeNotSatisfiable(msg))
		};

		let Some((unit, ranges)) = header.split_once('=') else {
			return reject("Malformed range".into());
		};
		let unit = unit.trim();
		if unit != RANGE_UNIT {
			return reject(format!("Unacceptable unit: '{}'", unit));
		}
		if ranges.contains(',') {
			return reject("Multiple ranges are not supported".into());
		}
		let Some((begin, end)) = ranges.split_once('-') else {
			return reject("Malformed range".into());
		};
		let (begin, end) = (begin.trim(), end.trim());
		if begin.is_empty() {
			return reject("First item offset must be clearly specified".into());
		}
		let (Ok(begin), Ok(end)) = (begin.parse::<u64>(), end.parse::<u64>()) else {
			return reject("Malformed range".into());
		};

		let limit = end.saturating_sub(begin);
		if limit < 1 {
			return reject("Invalid range".into());
		}
		if limit > max_limit {
			return reject(format!("Won't return more than {} items", max_limit));
		}

		Ok(Self { offset: begin, limit, partial: true })
	}

	/// `Content-Range` for a response carrying `returned` items.
	pub fn content_range(&self, returned: u64, total: Option<u64>) -> ContentRange {
		ContentRange { start: self.offset, end: self.offset + returned, total }
	}
}

/// `Content-Range: items start-end/total`, `*` when the total is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
	pub start: u64,
	pub end: u64,
	pub total: Option<u64>,
}

impl fmt::Display for ContentRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}-{}/", RANGE_UNIT, self.start, self.end)?;
		match self.total {
			Some(total) => write!(f, "{}", total),
			None => f.write_str("*"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn msg(result: RgResult<RangeWindow>) -> String {
		match result {
			Err(Error::RangeNotSatisfiable(msg)) => msg,
			other => format!("unexpected: {:?}", other),
		}
	}

	#[test]
	fn test_no_header_uses_default() {
		let window = RangeWindow::plan(None, 50, 50).unwrap();
		assert_eq!(window, RangeWindow { offset: 0, limit: 50, partial: false });
		assert_eq!(RangeWindow::plan(None, 20, 50).unwrap().limit, 20);
	}

	#[test]
	fn test_valid_window() {
		let window = RangeWindow::plan(Some("items=10-20"), 50, 50).unwrap();
		assert_eq!(window, RangeWindow { offset: 10, limit: 10, partial: true });
		assert_eq!(window.content_range(7, None).to_string(), "items 10-17/*");
		assert_eq!(window.content_range(10, Some(42)).to_string(), "items 10-20/42");
	}

	#[test]
	fn test_rejections() {
		assert_eq!(msg(RangeWindow::plan(Some("items=0-0"), 50, 50)), "Invalid range");
		assert_eq!(msg(RangeWindow::plan(Some("items=5-2"), 50, 50)), "Invalid range");
		assert_eq!(
			msg(RangeWindow::plan(Some("items=0-51"), 50, 50)),
			"Won't return more than 50 items"
		);
		assert_eq!(msg(RangeWindow::plan(Some("bytes=0-10"), 50, 50)), "Unacceptable unit: 'bytes'");
		assert_eq!(
			msg(RangeWindow::plan(Some("items=0-5,10-15"), 50, 50)),
			"Multiple ranges are not supported"
		);
		assert_eq!(
			msg(RangeWindow::plan(Some("items=-5"), 50, 50)),
			"First item offset must be clearly specified"
		);
		assert_eq!(msg(RangeWindow::plan(Some("items=5-"), 50, 50)), "Malformed range");
		assert_eq!(msg(RangeWindow::plan(Some("garbage"), 50, 50)), "Malformed range");
	}

	#[test]
	fn test_max_window_is_allowed() {
		let window = RangeWindow::plan(Some("items=0-50"), 50, 50).unwrap();
		assert_eq!(window.limit, 50);
	}
}

// vim: ts=4
