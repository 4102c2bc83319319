//! Client side of the auth gateway.
//!
//! Mirrors what the login and signup pages do: validate locally, call the
//! gateway, and keep the bearer token under `token` in client storage.

use reqwest::{RequestBuilder, Url};
use thiserror::Error;
use tracing::{debug, info};

use crate::auth;
use crate::error::GatewayError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use crate::provider::with_trailing_slash;
use crate::storage::{KeyValueStore, StorageError, TOKEN_KEY};

#[derive(Error, Debug)]
pub enum ClientError {
    /// Caught before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The gateway answered with a failure envelope.
    #[error("{0}")]
    Rejected(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid gateway url: {0}")]
    Url(#[from] url::ParseError),
}

impl From<GatewayError> for ClientError {
    fn from(e: GatewayError) -> Self {
        ClientError::Validation(e.to_string())
    }
}

pub struct GatewayClient<S: KeyValueStore> {
    http: reqwest::Client,
    base_url: Url,
    storage: S,
}

impl<S: KeyValueStore> GatewayClient<S> {
    pub fn new(base_url: &str, storage: S) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: with_trailing_slash(Url::parse(base_url)?),
            storage,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The stored bearer token, if logged in.
    pub fn token(&self) -> Result<Option<String>, ClientError> {
        let Some(raw) = self.storage.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        Ok(serde_json::from_str(&raw).ok())
    }

    /// Create an account. Returns the gateway's confirmation message.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ClientError> {
        auth::validate_registration(name, email, password)?;

        let request = self.http.post(self.url("api/auth/register")?).json(&RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        let response = self.send(request).await?;
        Ok(response.message.unwrap_or_default())
    }

    /// Log in and store the issued token.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        auth::validate_login(email, password)?;

        let request = self.http.post(self.url("api/auth/login")?).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let response = self.send(request).await?;

        let (Some(token), Some(user)) = (response.token, response.user) else {
            return Err(ClientError::Rejected("Login failed".to_string()));
        };
        let encoded = serde_json::to_string(&token).map_err(StorageError::from)?;
        self.storage.set(TOKEN_KEY, &encoded)?;
        info!(email = %user.email, "Logged in");
        Ok(user)
    }

    /// Drop the local token and tell the gateway. The token is removed even
    /// when the gateway call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let token = self.token()?;
        self.storage.remove(TOKEN_KEY)?;

        let mut request = self.http.post(self.url("api/auth/logout")?);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.send(request).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<UserProfile, ClientError> {
        let mut request = self.http.get(self.url("api/auth/user")?);
        if let Some(token) = self.token()? {
            request = request.bearer_auth(token);
        }
        let response = self.send(request).await?;
        response
            .user
            .ok_or_else(|| ClientError::Rejected("Missing user".to_string()))
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    /// Every gateway reply, success or failure, is an `AuthResponse`.
    async fn send(&self, request: RequestBuilder) -> Result<AuthResponse, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body: AuthResponse = response.json().await?;
        debug!(%status, success = body.success, "Gateway replied");

        if body.success {
            Ok(body)
        } else {
            Err(ClientError::Rejected(
                body.message
                    .unwrap_or_else(|| format!("Request failed with status {}", status)),
            ))
        }
    }
}
