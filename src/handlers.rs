//! HTTP route handlers for the auth API.
//!
//! Each handler unpacks the request, calls into `auth`, and returns either the
//! success envelope or a `GatewayError` that renders the failure envelope.

use crate::auth;
use crate::error::GatewayError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use std::sync::Arc;
use tracing::warn;

type AuthResult = Result<Json<AuthResponse>, GatewayError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection);
        GatewayError::MalformedBody("Invalid request body".to_string())
    })
}

fn token_from(headers: &HeaderMap) -> Option<&str> {
    auth::bearer_token(headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult {
    let request = body(payload)?;
    auth::register(state.provider.as_ref(), &request).await.map(Json)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult {
    let request = body(payload)?;
    auth::login(state.provider.as_ref(), &request).await.map(Json)
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> AuthResult {
    auth::logout(state.provider.as_ref(), token_from(&headers))
        .await
        .map(Json)
}

pub async fn current_user(State(state): State<Arc<AppState>>, headers: HeaderMap) -> AuthResult {
    auth::current_user(state.provider.as_ref(), token_from(&headers))
        .await
        .map(Json)
}
