//! Helpers for driving the router in tests.

use std::{
    collections::HashMap,
    sync::{Mutex, OnceLock},
};

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{app::build_app, auth::password::hash_password, state::AppState, users::repo_types::User};

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

// argon2 is slow in debug builds; hash each distinct password once per run.
fn cached_hash(password: &str) -> String {
    static HASHES: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
    let mut hashes = HASHES.get_or_init(Default::default).lock().unwrap();
    hashes
        .entry(password.to_string())
        .or_insert_with(|| hash_password(password).unwrap())
        .clone()
}

pub async fn seed(state: &AppState, username: &str, password: &str, is_admin: bool, age: i32) -> User {
    let user = User {
        id: Uuid::new_v4(),
        username: username.into(),
        password_hash: cached_hash(password),
        is_admin,
        age,
        hobbies: vec!["Reading".into()],
    };
    state.users.insert(&user).await.unwrap()
}

pub fn token_for(state: &AppState, user: &User) -> String {
    state.jwt.issue(user).unwrap()
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(t) => builder.header(header::AUTHORIZATION, format!("Bearer {t}")),
        None => builder,
    }
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    builder(method, uri, token).body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    builder(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(state: &AppState, req: Request<Body>) -> TestResponse {
    let res = build_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    TestResponse { status, headers, body }
}

pub fn body_json(res: &TestResponse) -> Value {
    serde_json::from_slice(&res.body).unwrap()
}
