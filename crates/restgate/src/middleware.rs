//! Custom middlewares

use axum::{
	body::Body,
	extract::State,
	http::{Method, Request},
	middleware::Next,
	response::Response,
};
use serde_json::Value;

use restgate_core::negotiate::effective_method;
use restgate_types::types::FilterClause;

use crate::extract::Caller;
use crate::prelude::*;
use crate::response::{append_vary, VARY_ON, X_HTTP_METHOD_OVERRIDE};

/// Query parameter naming the user in the toy authentication scheme
pub const TOY_AUTH_PARAM: &str = "auth";
/// Entity type the toy authentication looks users up in
pub const TOY_AUTH_ENTITY: &str = "users";

/// Honour `X-HTTP-Method-Override` on POST requests.
pub async fn method_override(mut req: Request<Body>, next: Next) -> RgResult<Response> {
	let requested = req.headers().get(X_HTTP_METHOD_OVERRIDE).and_then(|h| h.to_str().ok());
	let method = effective_method(req.method().as_str(), requested);

	if method != req.method().as_str() {
		let method = Method::from_bytes(method.as_bytes())
			.map_err(|_| Error::BadRequest(format!("Invalid method override: {}", method)))?;
		debug!(from = %req.method(), to = %method, "method override");
		*req.method_mut() = method;
	}

	Ok(next.run(req).await)
}

/// Every response, error bodies included, depends on the negotiated format.
pub async fn vary(req: Request<Body>, next: Next) -> Response {
	let mut res = next.run(req).await;
	append_vary(res.headers_mut(), VARY_ON);
	res
}

/// Subject for a stored user record: `is_staff` and `is_admin` flags become
/// the `staff` and `admin` roles.
pub fn subject_for_user(username: &str, user: &Record) -> Subject {
	let flag = |field: &str| user.get(field).and_then(Value::as_bool).unwrap_or(false);
	let mut roles = Vec::new();
	if flag("is_staff") {
		roles.push("staff");
	}
	if flag("is_admin") {
		roles.push("admin");
	}
	Subject::authenticated(username).with_roles(roles)
}

/// Very silly and insecure authentication: `?auth=<username>` makes the
/// request act as that user. Unknown users stay anonymous.
///
/// Meant for demos and tests only.
pub async fn toy_auth(State(app): State<App>, mut req: Request<Body>, next: Next) -> RgResult<Response> {
	let username = req
		.uri()
		.query()
		.and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
		.and_then(|pairs| pairs.into_iter().find(|(k, _)| k == TOY_AUTH_PARAM))
		.map(|(_, v)| v);

	if let Some(username) = username {
		let criteria = [FilterClause::eq("username", Value::String(username.clone()))];
		match app.store.fetch_one(TOY_AUTH_ENTITY, &criteria).await {
			Ok(user) => {
				let subject = subject_for_user(&username, &user);
				debug!(user = %username, roles = ?subject.roles, "toy auth");
				req.extensions_mut().insert(Caller(subject));
			}
			Err(Error::NotFound) => debug!(user = %username, "toy auth: unknown user"),
			Err(err) => return Err(err),
		}
	}

	Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_subject_for_user() {
		let Value::Object(user) = json!({"username": "eggs", "is_staff": true, "is_admin": true})
		else {
			unreachable!()
		};
		let subject = subject_for_user("eggs", &user);
		assert_eq!(subject.id.as_deref(), Some("eggs"));
		assert!(subject.has_role("staff"));
		assert!(subject.has_role("admin"));

		let subject = subject_for_user("spam", &Record::new());
		assert!(subject.roles.is_empty());
	}
}

// vim: ts=4
