//! Jotter library - note core and auth gateway.
//!
//! The note core (`notes`, `store`, `editor`, `storage`) is client-side state:
//! a list of notes kept in a key-value store. The gateway (`auth`, `provider`,
//! `handlers`) is a stateless HTTP facade over an external identity provider.
//! `client` is the client's view of that gateway.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub mod auth;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notes;
pub mod provider;
pub mod storage;
pub mod store;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn provider::IdentityProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn provider::IdentityProvider>) -> Self {
        Self { provider }
    }
}

/// Routes of the auth API, with permissive CORS for the browser client.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/user", get(handlers::current_user))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Re-export commonly used types
pub use models::{
    AuthResponse, LoginRequest, Note, NoteId, NoteView, RegisterRequest, SortOrder, UserProfile,
};

pub use notes::{add_note, delete_note, next_id, project, toggle_pin, update_note};

pub use auth::{validate_login, validate_registration, MIN_PASSWORD_LEN};

pub use client::{ClientError, GatewayClient};
pub use config::{Config, ConfigError};
pub use editor::{NoteEditor, Submitted};
pub use error::GatewayError;
pub use provider::{IdentityProvider, ProviderError, SupabaseProvider};
pub use storage::{KeyValueStore, MemoryStorage, SledStorage, StorageError};
pub use store::NoteStore;
