//! HTTP client for the Cube.js reporting API

use super::api::ReportingApi;
use super::models::{LoadResponse, MetaResponse, CONTINUE_WAIT};
use super::retry::{Attempt, RetryPolicy};
use super::token::{Credentials, HttpTokenProvider, TokenProvider};
use crate::config::ApiConfig;
use crate::core::export::QuerySpec;
use crate::domain::{CubeApiError, CubeMetadata, CubexError, Page, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Reporting API client
///
/// Obtains a token before every request and sends it verbatim as the
/// `Authorization` header. Still-processing answers are retried according to
/// the configured [`RetryPolicy`].
pub struct CubeApiClient {
    client: Client,
    meta_url: String,
    load_url: String,
    credentials: Credentials,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
}

impl CubeApiClient {
    /// Build the HTTP client shared by the token provider and data calls
    ///
    /// # Errors
    ///
    /// Returns a connection error if the TLS backend cannot be initialised.
    pub fn http_client(config: &ApiConfig) -> Result<Client> {
        let mut builder = ClientBuilder::new().connect_timeout(Duration::from_secs(30));

        // 0 leaves requests unbounded
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        builder.build()
            .map_err(|e| {
                CubeApiError::ConnectionFailed(format!("Failed to build HTTP client: {e}")).into()
            })
    }

    /// Create a client from configuration, logging in through the auth endpoint
    ///
    /// # Errors
    ///
    /// Returns a configuration error when credentials are missing.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let credentials = Credentials::from_config(config)?;
        let client = Self::http_client(config)?;
        let tokens = Arc::new(HttpTokenProvider::new(
            client.clone(),
            config.endpoint(&config.auth_path),
        ));

        Ok(Self::new(client, config, credentials, tokens))
    }

    /// Create a client with an explicit credential context and token source
    pub fn new(
        client: Client,
        config: &ApiConfig,
        credentials: Credentials,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            meta_url: config.endpoint(&config.meta_path),
            load_url: config.endpoint(&config.load_path),
            credentials,
            tokens,
            retry: RetryPolicy::from_config(&config.retry),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Send one request and classify the answer
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Attempt<Value>> {
        let token = self.tokens.obtain(&self.credentials).await?;

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, token.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.tokens.invalidate().await;
            return Err(CubeApiError::AuthenticationFailed(format!(
                "Token rejected by {url} (status {status})"
            ))
            .into());
        }

        let parsed: Option<Value> = serde_json::from_str(&text).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error")).map(error_message);

        if error.as_deref() == Some(CONTINUE_WAIT) {
            return Ok(Attempt::StillProcessing);
        }

        if !status.is_success() {
            let message = error.unwrap_or(text);
            return Err(if status.is_server_error() {
                CubeApiError::ServerError {
                    status: status.as_u16(),
                    message,
                }
            } else {
                CubeApiError::ClientError {
                    status: status.as_u16(),
                    message,
                }
            }
            .into());
        }

        if let Some(message) = error {
            return Err(CubeApiError::QueryFailed(message).into());
        }

        parsed.map(Attempt::Ready).ok_or_else(|| {
            CubexError::from(CubeApiError::InvalidResponse(format!(
                "Response from {url} is not JSON"
            )))
        })
    }
}

fn transport_error(e: reqwest::Error) -> CubexError {
    if e.is_timeout() {
        CubeApiError::Timeout(e.to_string()).into()
    } else {
        CubeApiError::ConnectionFailed(e.to_string()).into()
    }
}

fn error_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ReportingApi for CubeApiClient {
    async fn fetch_catalog(&self) -> Result<Vec<CubeMetadata>> {
        tracing::debug!(url = %self.meta_url, "Fetching cube catalog");

        let value = self
            .retry
            .run(|| self.execute(Method::GET, &self.meta_url, None))
            .await?;

        let meta: MetaResponse = serde_json::from_value(value)
            .map_err(|e| CubeApiError::InvalidResponse(format!("Malformed catalog: {e}")))?;

        let cubes = meta
            .cubes
            .into_iter()
            .map(CubeMetadata::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::info!(count = cubes.len(), "Fetched cube catalog");
        Ok(cubes)
    }

    async fn run_query(&self, query: &QuerySpec) -> Result<Page> {
        let body = query.to_request_body();

        tracing::debug!(
            url = %self.load_url,
            limit = query.limit,
            offset = query.offset,
            "Running load query"
        );

        let value = self
            .retry
            .run(|| self.execute(Method::POST, &self.load_url, Some(&body)))
            .await?;

        let response: LoadResponse = serde_json::from_value(value)
            .map_err(|e| CubeApiError::InvalidResponse(format!("Malformed load response: {e}")))?;

        Ok(Page::new(response.data))
    }
}
