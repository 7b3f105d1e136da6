//! Service-account credential loading.
//!
//! The credential is a JSON service-account document. It arrives either
//! inline through the `VISION_CREDENTIALS_JSON` secret (the way the original
//! deployment supplies it from its secret store) or as a file path through
//! `GOOGLE_APPLICATION_CREDENTIALS`. Loading failure must not take the
//! process down: callers keep the upload/crop flow alive and disable
//! detection instead.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use thiserror::Error;
use tracing::debug;

/// Env var holding the service-account JSON document inline.
pub const VISION_CREDENTIALS_ENV: &str = "VISION_CREDENTIALS_JSON";

/// Errors raised while loading or exchanging credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(
        "No credentials configured: set {VISION_CREDENTIALS_ENV} to the service-account JSON \
         or GOOGLE_APPLICATION_CREDENTIALS to its file path"
    )]
    Missing,

    #[error("Invalid service-account credentials: {0}")]
    Invalid(String),

    #[error("Token exchange failed: {0}")]
    Exchange(String),
}

/// An access token with its expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Source of OAuth access tokens.
///
/// The production implementation wraps a gcp_auth service account; tests
/// substitute a static provider.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn fetch_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError>;
}

#[async_trait]
impl AccessTokenProvider for CustomServiceAccount {
    async fn fetch_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        let token = self
            .token(scopes)
            .await
            .map_err(|e| CredentialError::Exchange(e.to_string()))?;

        Ok(AccessToken {
            token: token.as_str().to_string(),
            expires_at: token.expires_at(),
        })
    }
}

/// Construct a token provider from an inline service-account JSON document.
pub fn credentials_from_json(json: &str) -> Result<Arc<dyn AccessTokenProvider>, CredentialError> {
    let account = CustomServiceAccount::from_json(json)
        .map_err(|e| CredentialError::Invalid(e.to_string()))?;
    Ok(Arc::new(account))
}

/// Load credentials from the process environment.
///
/// The inline secret takes precedence; the file-path convention is the
/// fallback. Either way the JSON is handed to the authentication library
/// opaquely.
pub fn load_default_credentials() -> Result<Arc<dyn AccessTokenProvider>, CredentialError> {
    if let Ok(json) = std::env::var(VISION_CREDENTIALS_ENV) {
        debug!("Loading Vision credentials from inline secret");
        return credentials_from_json(&json);
    }

    let account = CustomServiceAccount::from_env()
        .map_err(|e| CredentialError::Invalid(e.to_string()))?;

    match account {
        Some(account) => {
            debug!("Loading Vision credentials from GOOGLE_APPLICATION_CREDENTIALS");
            Ok(Arc::new(account))
        }
        None => Err(CredentialError::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_json_is_invalid() {
        let err = match credentials_from_json("{not valid json") {
            Ok(_) => panic!("expected an error"),
            Err(e) => e,
        };
        assert!(matches!(err, CredentialError::Invalid(_)));
    }

    #[test]
    fn test_valid_json_wrong_shape_is_invalid() {
        // Parses as JSON but is not a service-account document.
        let err = match credentials_from_json(r#"{"hello": "world"}"#) {
            Ok(_) => panic!("expected an error"),
            Err(e) => e,
        };
        assert!(matches!(err, CredentialError::Invalid(_)));
    }

    #[test]
    fn test_missing_error_names_both_sources() {
        let msg = CredentialError::Missing.to_string();
        assert!(msg.contains("VISION_CREDENTIALS_JSON"));
        assert!(msg.contains("GOOGLE_APPLICATION_CREDENTIALS"));
    }
}
