use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "shelfscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter: this crate at info, dependencies at warn.
pub fn default_log_filter() -> String {
    format!("warn,{APP_NAME}=info")
}

/// Get the application data directory
/// (`<platform data dir>/shelfscan` — e.g. `~/.local/share/shelfscan`)
pub fn app_data_dir() -> PathBuf {
    let base = dirs::data_dir().expect("Cannot determine data directory");
    base.join(APP_NAME)
}

/// Default location of the persisted shelf collection.
pub fn shelf_file() -> PathBuf {
    app_data_dir().join("shelf.json")
}

/// Endpoint and identity configuration for the remote backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the callable-function endpoints.
    pub functions_base_url: String,
    /// Base URL for direct object downloads (processed OCR output).
    pub storage_base_url: String,
    /// Authentication policy for callable invocations.
    pub auth: AuthPolicy,
}

impl RemoteConfig {
    /// Build a configuration with the default guest identity.
    pub fn new(
        functions_base_url: impl Into<String>,
        storage_base_url: impl Into<String>,
    ) -> Self {
        Self {
            functions_base_url: functions_base_url.into(),
            storage_base_url: storage_base_url.into(),
            auth: AuthPolicy::default(),
        }
    }

    pub fn with_auth(mut self, auth: AuthPolicy) -> Self {
        self.auth = auth;
        self
    }
}

/// Whether callable invocations carry credentials.
///
/// The backend exists in two variants: one enforces authentication,
/// the other runs with a fixed guest identity. The choice is explicit
/// configuration, never inferred from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuthPolicy {
    /// Fixed guest identity, no token attached.
    Guest { user_id: String },
    /// Bearer token attached to every callable invocation.
    Required { user_id: String, id_token: String },
}

impl AuthPolicy {
    /// User segment used in derived storage paths.
    pub fn user_id(&self) -> &str {
        match self {
            Self::Guest { user_id } | Self::Required { user_id, .. } => user_id,
        }
    }

    /// Bearer token for callable invocations, if the policy carries one.
    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            Self::Guest { .. } => None,
            Self::Required { id_token, .. } => Some(id_token),
        }
    }
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self::Guest {
            user_id: "guest".to_string(),
        }
    }
}
