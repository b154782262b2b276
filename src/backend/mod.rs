pub mod mock;
pub mod supabase;
pub mod traits;
pub mod types;

pub use mock::MockBackend;
pub use supabase::SupabaseBackend;
pub use traits::{Backend, BackendResult};
pub use types::{AuthUser, OAuthProvider, Session, SignUpData, SignUpOutcome};

use crate::config::{BackendMode, Config, ConfigError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email address has not been confirmed")]
    EmailNotConfirmed,

    #[error("Not signed in or session expired")]
    Unauthenticated,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Backend misconfigured: {0}")]
    Config(#[from] ConfigError),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Hosted client when credentials are configured, in-memory mock otherwise
pub fn connect(config: &Config) -> BackendResult<Arc<dyn Backend>> {
    match config.mode {
        BackendMode::Hosted => {
            let (url, key) = config.hosted_credentials()?;
            Ok(Arc::new(SupabaseBackend::new(url, key)?))
        }
        BackendMode::Mock => {
            info!("Using in-memory mock backend");
            Ok(Arc::new(MockBackend::new()))
        }
    }
}
