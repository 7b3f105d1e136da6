//! Application state.

use std::sync::Arc;

use croploc_vision::{load_default_credentials, VisionClient, VisionConfig};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::session::SessionStore;

/// Shared application state.
///
/// `vision` is an explicit optional client handle: when credential loading
/// fails at startup the handle stays `None`, upload and crop keep working,
/// and the detect endpoints report the disabled state. There is no ambient
/// readiness flag.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub vision: Option<Arc<VisionClient>>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Create state with an explicit (possibly absent) Vision client.
    pub fn new(config: ApiConfig, vision: Option<Arc<VisionClient>>) -> Self {
        Self {
            config,
            vision,
            sessions: SessionStore::new(),
        }
    }

    /// Create state, attempting to construct the Vision client from the
    /// environment. Credential failure is non-fatal: the process stays up
    /// with detection disabled and a visible warning.
    pub fn initialize(config: ApiConfig) -> Self {
        let vision = match load_default_credentials() {
            Ok(provider) => match VisionClient::new(VisionConfig::from_env(), provider) {
                Ok(client) => {
                    info!("Vision client initialized, detection enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    warn!("Could not construct Vision client, detection disabled: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Could not load Vision API credentials, detection disabled: {}", e);
                None
            }
        };

        Self::new(config, vision)
    }

    /// Whether a credential-backed client is ready.
    pub fn detection_enabled(&self) -> bool {
        self.vision.is_some()
    }
}
