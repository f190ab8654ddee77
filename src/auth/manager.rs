//! Login exchange against the file store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::credentials::CredentialStore;
use crate::config::LOGIN_TIMEOUT;
use crate::error::{MediaSyncError, Result};
use crate::filestore::types::ApiEnvelope;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    otp_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: Option<String>,
}

/// Performs the login exchange and is the single writer of the shared token.
#[derive(Debug)]
pub struct AuthManager {
    http: reqwest::Client,
    login_url: String,
    credentials: Arc<CredentialStore>,
    /// Serializes login exchanges so racing callers never interleave writes.
    gate: Mutex<()>,
}

impl AuthManager {
    /// Create a manager sharing the transport's HTTP client and credentials.
    pub fn new(http: reqwest::Client, base_url: &str, credentials: Arc<CredentialStore>) -> Self {
        Self {
            http,
            login_url: format!("{}/api/auth/login", base_url.trim_end_matches('/')),
            credentials,
            gate: Mutex::new(()),
        }
    }

    /// True when a login pair is configured, i.e. re-authentication can work.
    pub fn can_authenticate(&self) -> bool {
        self.credentials.has_login()
    }

    /// Exchange the configured login pair for a fresh token.
    ///
    /// Overwrites the shared token on success so every subsequent request
    /// picks it up. At most one exchange is in flight at a time; a caller
    /// racing an in-flight exchange waits, then performs its own.
    pub async fn authenticate(&self) -> Result<String> {
        let _guard = self.gate.lock().await;

        let Some((username, password)) = self.credentials.login_pair() else {
            return Err(MediaSyncError::MissingCredentials(
                "username and password are required to log in",
            ));
        };

        debug!("Logging in to file store as {}", username);
        let response = self
            .http
            .post(&self.login_url)
            .timeout(LOGIN_TIMEOUT)
            .json(&LoginRequest {
                username,
                password,
                otp_code: "",
            })
            .send()
            .await
            .map_err(MediaSyncError::from_transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(MediaSyncError::from_transport)?;
        if !status.is_success() {
            return Err(MediaSyncError::LoginRejected(body));
        }

        let envelope: ApiEnvelope<LoginData> = serde_json::from_str(&body)?;
        if envelope.code != 200 {
            return Err(MediaSyncError::LoginRejected(body));
        }
        let token = envelope
            .data
            .and_then(|data| data.token)
            .filter(|token| !token.is_empty());
        let Some(token) = token else {
            return Err(MediaSyncError::LoginRejected(body));
        };

        self.credentials.set_token(token.clone());
        info!("Refreshed file store token");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn manager_with_login(base_url: &str) -> (AuthManager, Arc<CredentialStore>) {
        let credentials = Arc::new(CredentialStore::new(
            None,
            Some("api".to_string()),
            Some("secret".to_string()),
        ));
        let manager = AuthManager::new(reqwest::Client::new(), base_url, Arc::clone(&credentials));
        (manager, credentials)
    }

    #[tokio::test]
    async fn test_authenticate_without_login_pair_is_config_error() {
        let credentials = Arc::new(CredentialStore::new(None, None, None));
        let manager = AuthManager::new(reqwest::Client::new(), "http://unused", credentials);

        let err = manager.authenticate().await.unwrap_err();
        assert!(matches!(err, MediaSyncError::MissingCredentials(_)));
    }

    #[tokio::test]
    async fn test_authenticate_stores_token() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::PartialJson(json!({
                "username": "api",
                "password": "secret",
                "otp_code": "",
            })))
            .with_header("content-type", "application/json")
            .with_body(json!({"code": 200, "data": {"token": "tok-1"}}).to_string())
            .expect(1)
            .create_async()
            .await;

        let (manager, credentials) = manager_with_login(&server.url());
        let token = manager.authenticate().await.unwrap();

        assert_eq!(token, "tok-1");
        assert_eq!(credentials.token().unwrap(), "tok-1");
        login.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_authenticate_calls_are_serialized() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api/auth/login")
            .with_header("content-type", "application/json")
            .with_body(json!({"code": 200, "data": {"token": "tok-1"}}).to_string())
            .expect(2)
            .create_async()
            .await;

        let (manager, credentials) = manager_with_login(&server.url());
        let manager = Arc::new(manager);
        let first = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.authenticate().await }
        });
        let second = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.authenticate().await }
        });

        // Both callers complete with a valid token; the gate keeps the two
        // exchanges from interleaving, it does not dedupe them.
        assert_eq!(first.await.unwrap().unwrap(), "tok-1");
        assert_eq!(second.await.unwrap().unwrap(), "tok-1");
        assert_eq!(credentials.token().unwrap(), "tok-1");
        login.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_login_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(403)
            .with_body("bad credentials")
            .create_async()
            .await;

        let (manager, credentials) = manager_with_login(&server.url());
        let err = manager.authenticate().await.unwrap_err();

        assert!(matches!(err, MediaSyncError::LoginRejected(body) if body == "bad credentials"));
        assert!(credentials.token().is_none());
    }

    #[tokio::test]
    async fn test_envelope_error_code_rejects_login() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_header("content-type", "application/json")
            .with_body(json!({"code": 500, "message": "storage offline"}).to_string())
            .create_async()
            .await;

        let (manager, _) = manager_with_login(&server.url());
        let err = manager.authenticate().await.unwrap_err();
        assert!(matches!(err, MediaSyncError::LoginRejected(_)));
    }

    #[tokio::test]
    async fn test_missing_token_in_payload_rejects_login() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_header("content-type", "application/json")
            .with_body(json!({"code": 200, "data": {}}).to_string())
            .create_async()
            .await;

        let (manager, credentials) = manager_with_login(&server.url());
        let err = manager.authenticate().await.unwrap_err();

        assert!(matches!(err, MediaSyncError::LoginRejected(_)));
        assert!(credentials.token().is_none());
    }
}
