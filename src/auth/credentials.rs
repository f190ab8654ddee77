//! Credential state shared by every outgoing call.

use std::sync::{PoisonError, RwLock};

use base64::Engine;

/// Credentials for the file store: an opaque token and/or a login pair.
///
/// The token is the only field mutated after construction. It sits behind an
/// `RwLock` so a reader always observes a complete value, never a partial
/// write from a concurrent refresh.
#[derive(Debug)]
pub struct CredentialStore {
    token: RwLock<Option<String>>,
    username: Option<String>,
    password: Option<String>,
}

impl CredentialStore {
    /// Create a store from an optional token and login pair.
    pub fn new(token: Option<String>, username: Option<String>, password: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
            username,
            password,
        }
    }

    /// Current token, if any.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the token. Only the auth manager calls this.
    pub fn set_token(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// True when a username/password pair is configured.
    pub fn has_login(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// The login pair, when both halves are configured.
    pub fn login_pair(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }

    /// Authorization header value for the next request.
    ///
    /// A configured token always wins and is sent verbatim: the store expects
    /// the raw token, not a scheme-prefixed value. Without a token the login
    /// pair doubles as HTTP basic credentials.
    pub fn auth_header(&self) -> Option<String> {
        if let Some(token) = self.token() {
            return Some(token);
        }
        self.login_pair().map(|(username, password)| {
            let combined = format!("{}:{}", username, password);
            let encoded = base64::engine::general_purpose::STANDARD.encode(&combined);
            format!("Basic {}", encoded)
        })
    }
}
