//! Token caching for Vision API authentication.
//!
//! Provides a thread-safe, async-aware token cache with:
//! - Refresh margin to avoid token expiry during requests
//! - Single-flight pattern to prevent thundering herd on refresh
//! - Graceful fallback to existing valid token on refresh failure

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::credentials::AccessTokenProvider;
use crate::error::{VisionError, VisionResult};

/// Refresh margin: refresh token 60 seconds before expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Conservative token TTL when expiry is unknown (50 minutes).
/// OAuth tokens are typically valid for 60 minutes.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth scope for the Vision API.
pub const VISION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-vision";

/// Cached token with expiration tracking.
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Check if token is still valid with refresh margin.
    fn is_valid(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }

    /// Check if token is technically still usable (even if refresh is needed).
    fn is_usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Thread-safe token cache with single-flight refresh.
pub struct TokenCache {
    provider: Arc<dyn AccessTokenProvider>,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    /// Create a new token cache.
    pub fn new(provider: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(None),
        }
    }

    /// Invalidate the cached token.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }

    /// Get a valid access token, refreshing if necessary.
    ///
    /// Fast path: return the cached token while still valid. Slow path:
    /// acquire the write lock and refresh (double-checking first so a
    /// concurrent refresh is not repeated). On refresh failure an existing
    /// still-usable token is returned instead of an error.
    pub async fn get_token(&self) -> VisionResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;

        if let Some(cached) = cache.as_ref() {
            if cached.is_valid() {
                return Ok(cached.access_token.clone());
            }
        }

        self.refresh_token(&mut cache).await
    }

    /// Refresh the token, updating the cache.
    async fn refresh_token(&self, cache: &mut Option<CachedToken>) -> VisionResult<String> {
        match self.provider.fetch_token(&[VISION_SCOPE]).await {
            Ok(token) => {
                let access_token = token.token.clone();

                // Prefer the real expiry, fall back to a conservative default.
                let expires_at = {
                    let now = Utc::now();
                    if token.expires_at > now {
                        match (token.expires_at - now).to_std() {
                            Ok(ttl) => Instant::now() + ttl,
                            Err(_) => Instant::now() + TOKEN_DEFAULT_TTL,
                        }
                    } else {
                        // Already-expired tokens get a near-immediate expiry so
                        // the next request forces another refresh.
                        Instant::now()
                    }
                };

                *cache = Some(CachedToken {
                    access_token: access_token.clone(),
                    expires_at,
                });

                debug!("Refreshed Vision auth token");
                Ok(access_token)
            }
            Err(e) => {
                if let Some(cached) = cache.as_ref() {
                    if cached.is_usable() {
                        warn!("Token refresh failed, using existing token: {}", e);
                        return Ok(cached.access_token.clone());
                    }
                }

                Err(VisionError::auth(format!(
                    "Failed to obtain auth token: {}",
                    e
                )))
            }
        }
    }
}
