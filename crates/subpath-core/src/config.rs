//! HTTP configuration and its validation.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Route the root URL redirects to.
pub const DEFAULT_ROUTE: &str = "/app/home";

/// Base path related HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpConfig {
    /// Prefix the server is reachable under, e.g. `/kibana`.
    pub base_path: Option<String>,
    /// Whether the server strips `base_path` from inbound URLs itself
    /// (otherwise a proxy in front of it is expected to).
    pub rewrite_base_path: bool,
    pub default_route: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            rewrite_base_path: false,
            default_route: DEFAULT_ROUTE.into(),
        }
    }
}

impl HttpConfig {
    /// Normalize and check the settings. An empty base path becomes `None`.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.base_path = self.base_path.filter(|path| !path.is_empty());

        if let Some(base_path) = &self.base_path {
            if !is_valid_base_path(base_path) {
                return Err(ConfigError::InvalidBasePath(base_path.clone()));
            }
        } else if self.rewrite_base_path {
            return Err(ConfigError::RewriteWithoutBasePath);
        }

        if !self.default_route.starts_with('/') {
            return Err(ConfigError::InvalidDefaultRoute(self.default_route));
        }

        Ok(self)
    }
}

/// Starts with a slash, has something after it, and does not end with one.
pub fn is_valid_base_path(path: &str) -> bool {
    path.len() > 1 && path.starts_with('/') && !path.ends_with('/')
}
