//! Test helper utilities for webserver integration tests

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use std::net::SocketAddr;
use tower::ServiceExt;

use store::SqliteStore;
use webserver::{JhaRepository, RealJhaRepository, WebServer};

/// Create the bind address used by test servers (never actually bound)
pub fn create_test_address() -> SocketAddr {
    "127.0.0.1:5000".parse().unwrap()
}

/// Build a router over a fresh in-memory store
pub fn create_test_app() -> Router {
    let repository = RealJhaRepository::new(SqliteStore::open_in_memory().unwrap());
    create_app_with(repository)
}

/// Build a router over any repository, e.g. a mock
pub fn create_app_with<R: JhaRepository + 'static>(repository: R) -> Router {
    WebServer::new(create_test_address(), repository).build_router()
}

/// Send one request through the router and decode the JSON response
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_request(app, request).await
}

/// Send a prebuilt request, for bodies `send` cannot express
pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}
