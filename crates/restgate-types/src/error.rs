//! Error type shared by every restgate crate.
//!
//! Each variant maps to exactly one HTTP status. Messages are short and never
//! carry storage-layer detail; that is logged instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub type RgResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Conditional GET hit: the client's copy is current (304, empty body)
	NotModified,
	/// Requested entity does not exist
	NotFound,
	/// Malformed request line: query string or method override
	BadRequest(String),
	/// No registered serializer matches the `Accept` header
	NotAcceptable(String),
	/// Request body has no registered deserializer, or does not decode with it
	UnsupportedMediaType(String),
	/// Patch names an unknown or unwritable field
	UnprocessableEntity(String),
	/// Mutation without `If-Match`
	PreconditionRequired,
	/// `If-Match` does not match the current representation
	PreconditionFailed,
	/// Malformed or oversized `Range` header
	RangeNotSatisfiable(String),
	/// Method is not supported by the resource
	MethodNotAllowed,
	/// Server-side configuration problem detected while serving a request
	MisconfiguredServer(String),
	/// Configuration problem detected at registration time
	ConfigError(String),
	/// Storage failure
	DbError,
	/// Serialization failure while producing a response
	SerializationError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Error::NotModified => StatusCode::NOT_MODIFIED,
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::BadRequest(_) => StatusCode::BAD_REQUEST,
			Error::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
			Error::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			Error::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Error::PreconditionRequired => StatusCode::PRECONDITION_REQUIRED,
			Error::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
			Error::RangeNotSatisfiable(_) => StatusCode::RANGE_NOT_SATISFIABLE,
			Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
			Error::MisconfiguredServer(_)
			| Error::ConfigError(_)
			| Error::DbError
			| Error::SerializationError(_)
			| Error::Internal(_)
			| Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn code(&self) -> &'static str {
		match self {
			Error::NotModified => "E-NOT-MODIFIED",
			Error::NotFound => "E-NOT-FOUND",
			Error::BadRequest(_) => "E-BAD-REQUEST",
			Error::NotAcceptable(_) => "E-NOT-ACCEPTABLE",
			Error::UnsupportedMediaType(_) => "E-UNSUPPORTED-MEDIA-TYPE",
			Error::UnprocessableEntity(_) => "E-UNPROCESSABLE",
			Error::PreconditionRequired => "E-PRECONDITION-REQUIRED",
			Error::PreconditionFailed => "E-PRECONDITION-FAILED",
			Error::RangeNotSatisfiable(_) => "E-RANGE",
			Error::MethodNotAllowed => "E-METHOD",
			Error::MisconfiguredServer(_) | Error::ConfigError(_) => "E-CONFIG",
			Error::DbError => "E-DB",
			Error::SerializationError(_) | Error::Internal(_) | Error::Io(_) => "E-INTERNAL",
		}
	}

	/// Client-facing message. Internal details stay in the logs.
	fn public_message(&self) -> String {
		match self {
			Error::NotModified => "Not modified".into(),
			Error::NotFound => "Not found".into(),
			Error::BadRequest(msg)
			| Error::NotAcceptable(msg)
			| Error::UnsupportedMediaType(msg)
			| Error::UnprocessableEntity(msg)
			| Error::RangeNotSatisfiable(msg) => msg.clone(),
			Error::PreconditionRequired => {
				"This request is required to be conditional; try using \"If-Match\"".into()
			}
			Error::PreconditionFailed => "Precondition failed".into(),
			Error::MethodNotAllowed => "Method not allowed".into(),
			Error::MisconfiguredServer(_) | Error::ConfigError(_) => {
				"Server entity misconfiguration".into()
			}
			Error::DbError
			| Error::SerializationError(_)
			| Error::Internal(_)
			| Error::Io(_) => "Internal server error".into(),
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotModified => write!(f, "not modified"),
			Error::NotFound => write!(f, "not found"),
			Error::BadRequest(msg) => write!(f, "bad request: {}", msg),
			Error::NotAcceptable(msg) => write!(f, "not acceptable: {}", msg),
			Error::UnsupportedMediaType(msg) => write!(f, "unsupported media type: {}", msg),
			Error::UnprocessableEntity(msg) => write!(f, "unprocessable entity: {}", msg),
			Error::PreconditionRequired => write!(f, "precondition required"),
			Error::PreconditionFailed => write!(f, "precondition failed"),
			Error::RangeNotSatisfiable(msg) => write!(f, "range not satisfiable: {}", msg),
			Error::MethodNotAllowed => write!(f, "method not allowed"),
			Error::MisconfiguredServer(msg) => write!(f, "misconfigured server: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::DbError => write!(f, "database error"),
			Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::SerializationError(err.to_string())
	}
}

impl From<serde_yaml::Error> for Error {
	fn from(err: serde_yaml::Error) -> Self {
		Self::SerializationError(err.to_string())
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		if status == StatusCode::NOT_MODIFIED {
			return status.into_response();
		}
		if status.is_server_error() {
			tracing::error!(status = status.as_u16(), error = %self, "request failed");
		}
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": self.public_message(),
			}
		});
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert_eq!(Error::NotModified.status(), StatusCode::NOT_MODIFIED);
		assert_eq!(Error::PreconditionRequired.status().as_u16(), 428);
		assert_eq!(Error::PreconditionFailed.status().as_u16(), 412);
		assert_eq!(Error::UnprocessableEntity("x".into()).status().as_u16(), 422);
		assert_eq!(Error::RangeNotSatisfiable("x".into()).status().as_u16(), 416);
		assert_eq!(Error::NotAcceptable("x".into()).status().as_u16(), 406);
		assert_eq!(Error::UnsupportedMediaType("x".into()).status().as_u16(), 415);
		assert_eq!(Error::MisconfiguredServer("x".into()).status().as_u16(), 500);
	}

	#[test]
	fn test_not_modified_has_empty_body() {
		let response = Error::NotModified.into_response();
		assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
		assert!(response.headers().get("content-type").is_none());
	}

	#[test]
	fn test_internal_detail_is_not_exposed() {
		let err = Error::MisconfiguredServer("entity 'users' has no serializer".into());
		assert_eq!(err.public_message(), "Server entity misconfiguration");
		let err = Error::Internal("connection refused on 10.0.0.3".into());
		assert!(!err.public_message().contains("10.0.0.3"));
	}
}

// vim: ts=4
