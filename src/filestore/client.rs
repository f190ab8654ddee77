//! HTTP transport for the file store.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, redirect};
use serde::Serialize;

use crate::auth::{AuthManager, CredentialStore};
use crate::config::{CALL_TIMEOUT, CONNECT_TIMEOUT, Settings};
use crate::error::{MediaSyncError, Result};

/// Client for the remote file store.
///
/// Owns its credential state and hands it to the auth manager; the
/// authorization header is read fresh for every request, so a token refreshed
/// mid-flight is picked up by the next call. Redirects are never followed
/// because the resolver inspects 3xx responses itself.
#[derive(Debug)]
pub struct FileStoreClient {
    http: Client,
    base_url: String,
    link_base: String,
    dir_password: Option<String>,
    credentials: Arc<CredentialStore>,
    auth: AuthManager,
}

impl FileStoreClient {
    /// Build a client from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_call_timeout(settings, CALL_TIMEOUT)
    }

    /// Build a client with an explicit per-call timeout.
    pub(crate) fn with_call_timeout(
        settings: &Settings,
        call_timeout: std::time::Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(call_timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(MediaSyncError::Http)?;

        let credentials = Arc::new(CredentialStore::new(
            settings.token.clone(),
            settings.username.clone(),
            settings.password.clone(),
        ));
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        let auth = AuthManager::new(http.clone(), &base_url, Arc::clone(&credentials));

        Ok(Self {
            http,
            link_base: settings.link_base().trim_end_matches('/').to_string(),
            dir_password: settings.dir_password.clone(),
            base_url,
            credentials,
            auth,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Directory password sent with listing and resolve calls; empty when unset.
    pub(crate) fn dir_password(&self) -> &str {
        self.dir_password.as_deref().unwrap_or("")
    }

    pub(crate) fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Public link for `path`: the link base plus the encoded path.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}{}", self.link_base, encode_path(path))
    }

    /// Attach the current authorization header, if any credentials exist.
    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.auth_header() {
            Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
            None => request,
        }
    }

    /// POST a JSON body to an API endpoint under the base URL.
    pub(crate) async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Response> {
        let request = self.http.post(format!("{}{}", self.base_url, path)).json(body);
        self.with_auth(request)
            .send()
            .await
            .map_err(MediaSyncError::from_transport)
    }

    /// GET a URL with optional query parameters.
    pub(crate) async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.with_auth(request)
            .send()
            .await
            .map_err(MediaSyncError::from_transport)
    }
}

/// Percent-encode each path segment, preserving the separating slashes and
/// producing a single leading slash.
pub(crate) fn encode_path(path: &str) -> String {
    let encoded = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", encoded)
}
