//! Data models for the notes application.
//!
//! This module contains the core data structures shared by the client-side
//! note core and the auth gateway: notes, sort preference, user projections,
//! and the JSON bodies of the auth API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Note Types
// ============================================================================

/// Identifier of a note. Derived from the creation time in milliseconds.
pub type NoteId = i64;

/// Title given to notes submitted without one.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    /// Last create or content update. Pin toggling leaves it alone.
    pub timestamp: DateTime<Utc>,
}

/// Display order of the note lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    LatestFirst,
    OldestFirst,
}

impl SortOrder {
    /// Map the persisted `isLatestFirst` flag to an order.
    pub fn from_latest_first(latest_first: bool) -> Self {
        if latest_first {
            SortOrder::LatestFirst
        } else {
            SortOrder::OldestFirst
        }
    }

    pub fn is_latest_first(self) -> bool {
        self == SortOrder::LatestFirst
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::LatestFirst => SortOrder::OldestFirst,
            SortOrder::OldestFirst => SortOrder::LatestFirst,
        }
    }
}

/// The pinned/regular partition shown to the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteView {
    pub pinned: Vec<Note>,
    pub regular: Vec<Note>,
}

impl NoteView {
    pub fn len(&self) -> usize {
        self.pinned.len() + self.regular.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Auth API Types
// ============================================================================

/// Minimal user projection returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// JSON envelope used by every auth endpoint, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            token: None,
            user: None,
            message: Some(message.into()),
        }
    }

    pub fn login(token: String, user: UserProfile, message: impl Into<String>) -> Self {
        Self {
            success: true,
            token: Some(token),
            user: Some(user),
            message: Some(message.into()),
        }
    }

    pub fn user(user: UserProfile) -> Self {
        Self {
            success: true,
            token: None,
            user: Some(user),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            token: None,
            user: None,
            message: Some(message.into()),
        }
    }
}
