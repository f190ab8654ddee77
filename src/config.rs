//! Settings and constants for the file store integration.

use std::env;
use std::time::Duration;

/// Default file store base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5244";

/// Entries requested per listing page.
pub const PAGE_SIZE: usize = 50;

/// Connect timeout applied to every request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall budget for a single call.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Login exchanges use a shorter budget.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Central configuration for the file store integration.
///
/// Loaded once at startup from `MEDIASYNC_*` environment variables; the CLI
/// may override `base_url` and `dir_path`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// File store API base URL.
    pub base_url: String,
    /// Directory to catalog.
    pub dir_path: String,
    /// Per-directory password, if the store requires one.
    pub dir_password: Option<String>,
    /// Opaque bearer token, if one was already issued.
    pub token: Option<String>,
    /// Username for login or basic auth.
    pub username: Option<String>,
    /// Password for login or basic auth.
    pub password: Option<String>,
    /// Base URL for public file links; falls back to `base_url`.
    pub public_base_url: Option<String>,
}

impl Settings {
    /// Load settings from the environment.
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("MEDIASYNC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            dir_path: env::var("MEDIASYNC_DIR").unwrap_or_else(|_| "/".to_string()),
            dir_password: env::var("MEDIASYNC_DIR_PASSWORD").ok(),
            token: env::var("MEDIASYNC_TOKEN").ok(),
            username: env::var("MEDIASYNC_USERNAME").ok(),
            password: env::var("MEDIASYNC_PASSWORD").ok(),
            public_base_url: env::var("MEDIASYNC_PUBLIC_BASE_URL").ok(),
        }
    }

    /// Base URL used for public file links.
    pub fn link_base(&self) -> &str {
        self.public_base_url.as_deref().unwrap_or(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_settings(base_url: &str) -> Settings {
        Settings {
            base_url: base_url.to_string(),
            dir_path: "/".to_string(),
            dir_password: None,
            token: None,
            username: None,
            password: None,
            public_base_url: None,
        }
    }

    #[test]
    fn test_link_base_defaults_to_api_base() {
        let settings = bare_settings("http://store.example");
        assert_eq!(settings.link_base(), "http://store.example");
    }

    #[test]
    fn test_link_base_prefers_public_url() {
        let mut settings = bare_settings("http://store.example");
        settings.public_base_url = Some("http://cdn.example".to_string());
        assert_eq!(settings.link_base(), "http://cdn.example");
    }
}
