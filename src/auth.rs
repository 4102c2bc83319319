//! Authentication gateway.
//!
//! Forwards registration, login, logout and token introspection to the
//! identity provider and reshapes the answers into `AuthResponse`. Nothing is
//! stored here: the session lives in the bearer token held by the client.
//!
//! Credential validation also lives here, so the gateway and the client share
//! one set of rules.

use tracing::{error, info, warn};

use crate::error::GatewayError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::provider::{IdentityProvider, ProviderError};

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

pub const MISSING_FIELDS: &str = "Please fill in all fields";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const EMAIL_NOT_CONFIRMED: &str =
    "Please confirm your email before logging in. Check your inbox.";

// ============================================================================
// Validation
// ============================================================================

pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), GatewayError> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(GatewayError::Validation(MISSING_FIELDS.to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(GatewayError::Validation(PASSWORD_TOO_SHORT.to_string()));
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), GatewayError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(GatewayError::Validation(MISSING_FIELDS.to_string()));
    }
    Ok(())
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Log an unexpected provider failure and hide it behind `message`.
fn internal(context: &str, e: &ProviderError, message: &str) -> GatewayError {
    error!("{}: {}", context, e);
    GatewayError::Internal(message.to_string())
}

// ============================================================================
// Gateway Operations
// ============================================================================

pub async fn register(
    provider: &dyn IdentityProvider,
    request: &RegisterRequest,
) -> Result<AuthResponse, GatewayError> {
    validate_registration(&request.name, &request.email, &request.password)?;
    info!(email = %request.email, "Registration attempt");

    match provider
        .sign_up(&request.name, &request.email, &request.password)
        .await
    {
        Ok(Some(user)) => {
            info!(email = %user.email, "User created");
            Ok(AuthResponse::message("Account Created Successfully"))
        }
        Ok(None) => {
            warn!("Provider returned no user for registration");
            Err(GatewayError::Internal("Registration failed".to_string()))
        }
        Err(ProviderError::Rejected(message)) => {
            warn!("Registration rejected: {}", message);
            Err(GatewayError::Unauthorized(message))
        }
        Err(e) => Err(internal("Registration failed", &e, "Error in Adding User")),
    }
}

pub async fn login(
    provider: &dyn IdentityProvider,
    request: &LoginRequest,
) -> Result<AuthResponse, GatewayError> {
    validate_login(&request.email, &request.password)?;
    info!(email = %request.email, "Login attempt");

    match provider
        .sign_in_with_password(&request.email, &request.password)
        .await
    {
        Ok(Some(session)) => match session.user {
            Some(user) => {
                info!(email = %user.email, "Login successful");
                Ok(AuthResponse::login(
                    session.access_token,
                    user.profile(),
                    "Login Successfully",
                ))
            }
            None => {
                warn!("Provider session carried no user");
                Err(GatewayError::Unauthorized("Login failed".to_string()))
            }
        },
        Ok(None) => Err(GatewayError::Unauthorized("Login failed".to_string())),
        Err(ProviderError::Rejected(message)) => {
            warn!("Login rejected: {}", message);
            if message.contains("Email not confirmed") {
                Err(GatewayError::Unauthorized(EMAIL_NOT_CONFIRMED.to_string()))
            } else {
                Err(GatewayError::Unauthorized(message))
            }
        }
        Err(e) => Err(internal("Login failed", &e, "Error in Login server")),
    }
}

pub async fn logout(
    provider: &dyn IdentityProvider,
    token: Option<&str>,
) -> Result<AuthResponse, GatewayError> {
    match provider.sign_out(token).await {
        Ok(()) => Ok(AuthResponse::message("Logged out successfully")),
        Err(ProviderError::Rejected(message)) => {
            warn!("Logout rejected: {}", message);
            Err(GatewayError::Internal(message))
        }
        Err(e) => Err(internal("Logout failed", &e, "Error in logout")),
    }
}

pub async fn current_user(
    provider: &dyn IdentityProvider,
    token: Option<&str>,
) -> Result<AuthResponse, GatewayError> {
    let token = token.ok_or_else(|| GatewayError::Unauthorized("No token provided".to_string()))?;

    match provider.get_user(token).await {
        Ok(Some(user)) => Ok(AuthResponse::user(user.profile())),
        Ok(None) | Err(ProviderError::Rejected(_)) => {
            Err(GatewayError::Unauthorized("Invalid token".to_string()))
        }
        Err(e) => Err(internal("User lookup failed", &e, "Error fetching user")),
    }
}
