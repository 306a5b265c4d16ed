//! Access tokens for the Admin API.
//!
//! Tokens are fetched once per remediating invocation and never cached
//! across invocations.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use budgetguard_core::error::{GuardError, Result};

/// Default service-account token endpoint on the metadata server.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Bearer token. `Debug` never prints the secret.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<AccessToken>;
}

/// Fixed token (local runs, tests).
pub struct StaticToken(AccessToken);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(AccessToken::new(token))
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn fetch(&self) -> Result<AccessToken> {
        Ok(self.0.clone())
    }
}

/// Token from the instance metadata server (default service account).
pub struct MetadataServer {
    http: Client,
    url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl MetadataServer {
    pub fn new(http: Client) -> Self {
        Self::with_url(http, METADATA_TOKEN_URL)
    }

    pub fn with_url(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TokenSource for MetadataServer {
    async fn fetch(&self) -> Result<AccessToken> {
        let resp = self
            .http
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| GuardError::Credentials(format!("metadata server unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(GuardError::Credentials(format!(
                "metadata server returned HTTP {}",
                resp.status().as_u16()
            )));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| GuardError::Credentials(format!("invalid token response: {e}")))?;
        if body.access_token.is_empty() {
            return Err(GuardError::Credentials("metadata server returned an empty token".into()));
        }

        tracing::debug!(expires_in = ?body.expires_in, "access token acquired");
        Ok(AccessToken::new(body.access_token))
    }
}
