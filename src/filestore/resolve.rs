//! Download-URL resolution strategies.
//!
//! The store answers a link request in one of several shapes: a plain
//! redirect, a JSON envelope holding the URL (as a string or under one of a
//! few keys), or an HTML page when the path maps to a web view. The resolver
//! walks these strategies in a fixed order and only fails once the fallback
//! endpoint also comes up empty.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::Serialize;
use tracing::{debug, warn};

use super::client::{FileStoreClient, encode_path};
use super::types::{ApiEnvelope, LinkPayload};
use crate::error::{MediaSyncError, Result};

/// Key probe order for the direct-link JSON envelope.
const LINK_KEYS: [&str; 5] = ["raw_url", "url", "download_url", "link", "proxy_url"];

/// Key probe order for the fallback endpoint, which prefers proxied URLs.
const FALLBACK_KEYS: [&str; 5] = ["raw_url", "proxy_url", "url", "download_url", "link"];

/// Strategy that produced a resolved URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Redirect,
    JsonEnvelope,
    ApiFallback,
}

/// A concrete, fetchable URL for a stored file. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct ResolvedUrl {
    pub value: String,
    pub strategy: Strategy,
}

#[derive(Debug, Serialize)]
struct GetRequest<'a> {
    path: &'a str,
    password: &'a str,
}

impl FileStoreClient {
    /// Resolve a direct download URL for `path`.
    ///
    /// Tries the direct-link endpoint first (redirect, then JSON envelope),
    /// then `/api/fs/get`. Each step refreshes the token at most once on an
    /// authorization failure; a refresh spent in one step does not consume
    /// another step's retry.
    pub async fn resolve_download_url(&self, path: &str) -> Result<ResolvedUrl> {
        if let Some(resolved) = self.try_direct_link(path).await? {
            debug!("Resolved {} via {:?}", path, resolved.strategy);
            return Ok(resolved);
        }
        warn!("Direct link gave no usable URL for {}, trying fallback endpoint", path);
        self.try_fallback(path).await
    }

    /// Direct-link endpoint. `Ok(None)` means the response was HTML or
    /// otherwise unusable and the caller should consult the fallback.
    async fn try_direct_link(&self, path: &str) -> Result<Option<ResolvedUrl>> {
        let url = format!("{}/@file/link/path{}", self.base_url(), encode_path(path));
        let password = self.dir_password();
        let mut query: Vec<(&str, &str)> = Vec::new();
        if !password.is_empty() {
            query.push(("password", password));
        }

        let mut reauthed = false;
        loop {
            let response = self.get(&url, &query).await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && !reauthed && self.auth().can_authenticate() {
                debug!("Direct link rejected for {}, refreshing token", path);
                self.auth().authenticate().await?;
                reauthed = true;
                continue;
            }

            if status.is_redirection() {
                if let Some(location) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                {
                    return Ok(Some(ResolvedUrl {
                        value: location.to_string(),
                        strategy: Strategy::Redirect,
                    }));
                }
                // Redirect without a Location header; let the fallback decide.
                return Ok(None);
            }

            let html = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value.contains("text/html"));
            let body = response
                .text()
                .await
                .map_err(MediaSyncError::from_transport)?;
            if html {
                debug!("Direct link for {} answered with HTML", path);
                return Ok(None);
            }

            let Ok(envelope) = serde_json::from_str::<ApiEnvelope<LinkPayload>>(&body) else {
                debug!("Direct link for {} is not JSON", path);
                return Ok(None);
            };
            if envelope.code == 401 && !reauthed && self.auth().can_authenticate() {
                debug!("Direct link rejected in envelope for {}, refreshing token", path);
                self.auth().authenticate().await?;
                reauthed = true;
                continue;
            }

            return Ok(envelope
                .data
                .as_ref()
                .and_then(|data| data.find_url(&LINK_KEYS))
                .map(|value| ResolvedUrl {
                    value: value.to_string(),
                    strategy: Strategy::JsonEnvelope,
                }));
        }
    }

    /// Fallback "get file info" endpoint; exhausting it is a hard failure.
    async fn try_fallback(&self, path: &str) -> Result<ResolvedUrl> {
        let request = GetRequest {
            path,
            password: self.dir_password(),
        };

        let mut reauthed = false;
        loop {
            let response = self.post_json("/api/fs/get", &request).await?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(MediaSyncError::from_transport)?;

            if status == StatusCode::UNAUTHORIZED && !reauthed && self.auth().can_authenticate() {
                debug!("Fallback resolve rejected for {}, refreshing token", path);
                self.auth().authenticate().await?;
                reauthed = true;
                continue;
            }

            let envelope = serde_json::from_str::<ApiEnvelope<LinkPayload>>(&body).ok();
            if let Some(envelope) = &envelope
                && envelope.code == 401
                && !reauthed
                && self.auth().can_authenticate()
            {
                debug!("Fallback rejected in envelope for {}, refreshing token", path);
                self.auth().authenticate().await?;
                reauthed = true;
                continue;
            }

            let resolved = envelope
                .as_ref()
                .and_then(|envelope| envelope.data.as_ref())
                .and_then(|data| data.find_url(&FALLBACK_KEYS));
            return match resolved {
                Some(value) => Ok(ResolvedUrl {
                    value: value.to_string(),
                    strategy: Strategy::ApiFallback,
                }),
                None => Err(MediaSyncError::Unresolvable {
                    path: path.to_string(),
                    body,
                }),
            };
        }
    }
}
