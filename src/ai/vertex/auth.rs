//! Access tokens for Vertex AI calls.

use crate::{Error, Result};
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use std::path::Path;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a bearer token valid for the next request.
    async fn access_token(&self) -> Result<String>;
}

/// Service account credentials read from a JSON key file.
///
/// Token caching and refresh are handled by `gcp_auth`.
pub struct ServiceAccountTokenSource {
    account: CustomServiceAccount,
}

impl ServiceAccountTokenSource {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Authentication(format!(
                "Service account file not found at '{}'",
                path.display()
            )));
        }

        let account = CustomServiceAccount::from_file(path).map_err(|e| {
            Error::Authentication(format!(
                "Failed to load service account '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self { account })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String> {
        let token = self
            .account
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| Error::Authentication(format!("Token request failed: {}", e)))?;
        Ok(token.as_str().to_string())
    }
}

/// Fixed token, for local proxies and tests.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
