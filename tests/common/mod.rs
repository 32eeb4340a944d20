#![allow(dead_code)]
//! Shared helpers for driving the router in-process

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use todo_server::{create_router, AppState, Config, Database, SnapshotStore};
use tower::util::ServiceExt;

/// Build a router over a fresh database backed by `store`
pub fn create_test_app(store: Arc<dyn SnapshotStore>) -> (Router, Database) {
    let db = Database::open(store);
    let state = AppState::new(db.clone(), Arc::new(Config::default()));
    (create_router(state), db)
}

/// Send one request; returns the status and the parsed JSON body (Null if empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register a user and return its token
pub async fn register(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Create a todo and return its JSON
pub async fn create_todo(app: &Router, token: &str, title: &str, completed: bool) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/todos",
        Some(token),
        Some(serde_json::json!({
            "title": title,
            "description": "something to do",
            "completed": completed
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}
