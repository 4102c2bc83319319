//! External identity provider.
//!
//! `IdentityProvider` is the port the auth gateway talks to. `SupabaseProvider`
//! implements it against a GoTrue-style REST API (`/auth/v1/...`), which is
//! what Supabase exposes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::models::UserProfile;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider understood the request and refused it.
    #[error("{0}")]
    Rejected(String),

    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Malformed(e.to_string())
    }
}

/// A user as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub email: String,
    /// Display name from user metadata, if one was stored at sign-up.
    pub name: Option<String>,
}

impl ProviderUser {
    /// Client-facing projection; the name falls back to the email.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| self.email.clone()),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub access_token: String,
    pub user: Option<ProviderUser>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account. `Ok(None)` means the provider accepted the call but
    /// returned no user.
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderUser>, ProviderError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderSession>, ProviderError>;

    /// Revoke the session behind `access_token`, if any.
    async fn sign_out(&self, access_token: Option<&str>) -> Result<(), ProviderError>;

    /// Introspect a token. `Ok(None)` means no user is attached to it.
    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, ProviderError>;
}

// ============================================================================
// GoTrue wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Value>,
}

impl GoTrueUser {
    fn into_user(self) -> Option<ProviderUser> {
        let email = self.email?;
        let name = self
            .user_metadata
            .as_ref()
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(ProviderUser { email, name })
    }
}

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    #[serde(default)]
    user: Option<GoTrueUser>,
}

/// Pull a human-readable message out of a GoTrue error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// The sign-up endpoint answers with a bare user when confirmation is
/// pending, or with a session wrapping the user when it is not.
fn sign_up_user(body: Value) -> Result<Option<ProviderUser>, ProviderError> {
    let user_value = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ if body.get("id").is_some() => body,
        _ => return Ok(None),
    };
    let user: GoTrueUser = serde_json::from_value(user_value)?;
    Ok(user.into_user())
}

/// `Url::join` replaces the last path segment unless the base ends in '/'.
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

// ============================================================================
// Supabase adapter
// ============================================================================

pub struct SupabaseProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl SupabaseProvider {
    pub fn new(base_url: Url, api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Transport(format!("bad endpoint {}: {}", path, e)))
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ProviderError> {
        let response = request.header("apikey", &self.api_key).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }
        if status.is_server_error() {
            return Err(ProviderError::Transport(format!(
                "provider returned {}",
                status
            )));
        }

        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request rejected")
                .to_string()
        });
        Err(ProviderError::Rejected(message))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseProvider {
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderUser>, ProviderError> {
        let request = self
            .client
            .post(self.endpoint("auth/v1/signup")?)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }));

        let body = self.send(request).await?;
        sign_up_user(serde_json::from_str(&body)?)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderSession>, ProviderError> {
        let request = self
            .client
            .post(self.endpoint("auth/v1/token")?)
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }));

        let body = self.send(request).await?;
        let session: GoTrueSession = serde_json::from_str(&body)?;
        Ok(Some(ProviderSession {
            access_token: session.access_token,
            user: session.user.and_then(GoTrueUser::into_user),
        }))
    }

    async fn sign_out(&self, access_token: Option<&str>) -> Result<(), ProviderError> {
        let Some(token) = access_token else {
            return Ok(());
        };

        let request = self
            .client
            .post(self.endpoint("auth/v1/logout")?)
            .bearer_auth(token);

        self.send(request).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, ProviderError> {
        let request = self
            .client
            .get(self.endpoint("auth/v1/user")?)
            .bearer_auth(access_token);

        let body = self.send(request).await?;
        let user: GoTrueUser = serde_json::from_str(&body)?;
        Ok(user.into_user())
    }
}

// ============================================================================
// Test double
// ============================================================================

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct Account {
        name: String,
        password: String,
        confirmed: bool,
    }

    /// In-memory provider. Tokens are `token-<email>`.
    #[derive(Default)]
    pub struct FakeProvider {
        accounts: Mutex<HashMap<String, Account>>,
        pub unreachable: bool,
        pub sign_outs: Mutex<Vec<Option<String>>>,
    }

    impl FakeProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn offline() -> Self {
            Self {
                unreachable: true,
                ..Self::default()
            }
        }

        pub fn with_account(self, name: &str, email: &str, password: &str, confirmed: bool) -> Self {
            self.accounts.lock().unwrap().insert(
                email.to_string(),
                Account {
                    name: name.to_string(),
                    password: password.to_string(),
                    confirmed,
                },
            );
            self
        }

        fn check_reachable(&self) -> Result<(), ProviderError> {
            if self.unreachable {
                Err(ProviderError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }

        fn user(email: &str, account: &Account) -> ProviderUser {
            ProviderUser {
                email: email.to_string(),
                name: Some(account.name.clone()).filter(|n| !n.is_empty()),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn sign_up(
            &self,
            name: &str,
            email: &str,
            password: &str,
        ) -> Result<Option<ProviderUser>, ProviderError> {
            self.check_reachable()?;
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return Err(ProviderError::Rejected("User already registered".into()));
            }
            let account = Account {
                name: name.to_string(),
                password: password.to_string(),
                confirmed: false,
            };
            let user = Self::user(email, &account);
            accounts.insert(email.to_string(), account);
            Ok(Some(user))
        }

        async fn sign_in_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Option<ProviderSession>, ProviderError> {
            self.check_reachable()?;
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some(account) if account.password == password => {
                    if !account.confirmed {
                        return Err(ProviderError::Rejected("Email not confirmed".into()));
                    }
                    Ok(Some(ProviderSession {
                        access_token: format!("token-{}", email),
                        user: Some(Self::user(email, account)),
                    }))
                }
                _ => Err(ProviderError::Rejected("Invalid login credentials".into())),
            }
        }

        async fn sign_out(&self, access_token: Option<&str>) -> Result<(), ProviderError> {
            self.check_reachable()?;
            self.sign_outs
                .lock()
                .unwrap()
                .push(access_token.map(str::to_string));
            Ok(())
        }

        async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, ProviderError> {
            self.check_reachable()?;
            let email = access_token
                .strip_prefix("token-")
                .ok_or_else(|| ProviderError::Rejected("invalid JWT".into()))?;
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.get(email).map(|account| Self::user(email, account)))
        }
    }
}
