//! Common test utilities and helpers
//!
//! Builds the demo app on top of the in-memory store and drives it through
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use restgate::{demo, AppBuilder};
use restgate_core::GateSettings;
use restgate_store_adapter_memory::StoreAdapterMemory;

pub async fn demo_app() -> Router {
	demo_app_with(GateSettings::default()).await
}

pub async fn demo_app_with(settings: GateSettings) -> Router {
	let store = Arc::new(StoreAdapterMemory::new());
	demo::seed(store.as_ref()).await.unwrap();

	let mut builder = AppBuilder::new();
	builder.settings(settings).store(store);
	demo::register(&mut builder);
	let (_app, router) = builder.build().unwrap();
	router
}

#[derive(Debug)]
pub struct TestResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl TestResponse {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn json(&self) -> Value {
		serde_json::from_slice(&self.body).unwrap()
	}

	pub fn error_code(&self) -> String {
		self.json()["error"]["code"].as_str().unwrap_or_default().to_string()
	}

	pub fn error_message(&self) -> String {
		self.json()["error"]["message"].as_str().unwrap_or_default().to_string()
	}
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
	let response = router.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let headers = response.headers().clone();
	let body = response.into_body().collect().await.unwrap().to_bytes();
	TestResponse { status, headers, body }
}

pub fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
	let mut builder = Request::builder().uri(uri);
	for (name, value) in headers {
		builder = builder.header(*name, *value);
	}
	builder.body(Body::empty()).unwrap()
}

pub fn patch(uri: &str, body: &Value, headers: &[(&str, &str)]) -> Request<Body> {
	let mut builder =
		Request::builder().method("PATCH").uri(uri).header("content-type", "application/json");
	for (name, value) in headers {
		builder = builder.header(*name, *value);
	}
	builder.body(Body::from(serde_json::to_vec(body).unwrap())).unwrap()
}

/// Current ETag of `uri` as seen by the caller the URI authenticates as.
pub async fn etag_of(router: &Router, uri: &str) -> String {
	let res = send(router, get(uri)).await;
	assert_eq!(res.status, StatusCode::OK);
	res.header("etag").unwrap().to_string()
}

// vim: ts=4
