//! Custom extractors

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::prelude::*;

// Caller //
//********//
/// The subject a request is evaluated for.
///
/// Authentication middlewares insert a `Caller` into the request extensions;
/// without one the request is anonymous.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Subject);

impl<S> FromRequestParts<S> for Caller
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(parts.extensions.get::<Caller>().cloned().unwrap_or_default())
	}
}

// vim: ts=4
