//! Authentication token acquisition
//!
//! The reporting API hands out a token in exchange for an email/password
//! pair. The token is sent verbatim as the `Authorization` header value.

use super::models::{AuthRequest, AuthResponse};
use crate::config::{ApiConfig, SecretString};
use crate::domain::{CubeApiError, CubexError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use std::fmt;
use tokio::sync::Mutex;

/// Explicit credential context handed to the token provider
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }

    /// Credentials from the API configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if email or password is missing.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let email = config
            .email
            .clone()
            .ok_or_else(|| CubexError::Configuration("api.email is required".to_string()))?;
        let password = config
            .password
            .clone()
            .ok_or_else(|| CubexError::Configuration("api.password is required".to_string()))?;
        Ok(Self::new(email, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token issued by the auth endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

/// Source of authentication tokens
///
/// The API client asks for a token before every request; implementations
/// are free to cache, and must report rejected credentials as
/// [`CubeApiError::AuthenticationFailed`].
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange credentials for a token
    async fn obtain(&self, credentials: &Credentials) -> Result<Token>;

    /// Drop any cached token so the next `obtain` logs in again
    async fn invalidate(&self) {}
}

/// Token provider backed by the login endpoint, caching the issued token
pub struct HttpTokenProvider {
    client: Client,
    auth_url: String,
    cached: Mutex<Option<Token>>,
}

impl HttpTokenProvider {
    pub fn new(client: Client, auth_url: impl Into<String>) -> Self {
        Self {
            client,
            auth_url: auth_url.into(),
            cached: Mutex::new(None),
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<Token> {
        tracing::debug!(auth_url = %self.auth_url, email = %credentials.email, "Requesting token");

        let body = AuthRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret().as_ref(),
        };

        let response = self
            .client
            .post(&self.auth_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CubeApiError::ConnectionFailed(format!("Login request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CubeApiError::AuthenticationFailed(format!(
                "Credentials rejected for {} (status {status})",
                credentials.email
            ))
            .into());
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(if status.is_server_error() {
                CubeApiError::ServerError {
                    status: status.as_u16(),
                    message,
                }
            } else {
                CubeApiError::AuthenticationFailed(format!(
                    "Login failed with status {status}: {message}"
                ))
            }
            .into());
        }

        let parsed: AuthResponse = response.json().await.map_err(|e| {
            CubeApiError::InvalidResponse(format!("Login response has no token: {e}"))
        })?;

        if parsed.token.is_empty() {
            return Err(
                CubeApiError::AuthenticationFailed("Login returned an empty token".into()).into(),
            );
        }

        tracing::info!(email = %credentials.email, "Authenticated with reporting API");
        Ok(Token::new(parsed.token))
    }
}

#[async_trait]
impl TokenProvider for HttpTokenProvider {
    async fn obtain(&self, credentials: &Credentials) -> Result<Token> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = self.login(credentials).await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn invalidate(&self) {
        self.cached.lock().await.take();
    }
}
