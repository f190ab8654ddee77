//! Directory listing and catalog normalization.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::client::FileStoreClient;
use super::types::{ApiEnvelope, CatalogRecord, ListData, RawEntry};
use crate::config::PAGE_SIZE;
use crate::error::{MediaSyncError, Result};

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    path: &'a str,
    password: &'a str,
    refresh: bool,
    page: usize,
    per_page: usize,
}

impl FileStoreClient {
    /// Fetch every page of `dir_path` and concatenate entries in page order.
    ///
    /// Stops once the accumulated entries reach a total reported by the
    /// store; when no total is reported, stops on the first short page
    /// (including an empty one).
    pub async fn fetch_all_pages(&self, dir_path: &str) -> Result<Vec<RawEntry>> {
        let mut entries = Vec::new();
        let mut page = 1;
        let mut total = None;

        loop {
            let (page_entries, page_total) = self.list_page(dir_path, page).await?;
            let short_page = page_entries.len() < PAGE_SIZE;
            if page_total.is_some() {
                total = page_total;
            }
            entries.extend(page_entries);

            match total {
                Some(total) if entries.len() as u64 >= total => break,
                _ if short_page => break,
                _ => page += 1,
            }
        }

        debug!(
            "Listed {} entries under {} across {} pages",
            entries.len(),
            dir_path,
            page,
        );
        Ok(entries)
    }

    /// Fetch one listing page, refreshing the token at most once on an
    /// authorization failure and retrying the same page.
    async fn list_page(&self, dir_path: &str, page: usize) -> Result<(Vec<RawEntry>, Option<u64>)> {
        let request = ListRequest {
            path: dir_path,
            password: self.dir_password(),
            refresh: false,
            page,
            per_page: PAGE_SIZE,
        };

        let mut reauthed = false;
        loop {
            let response = self.post_json("/api/fs/list", &request).await?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(MediaSyncError::from_transport)?;

            if status == reqwest::StatusCode::UNAUTHORIZED
                && !reauthed
                && self.auth().can_authenticate()
            {
                debug!("Listing page {} rejected, refreshing token", page);
                self.auth().authenticate().await?;
                reauthed = true;
                continue;
            }
            if !status.is_success() {
                return Err(MediaSyncError::ListFailed {
                    status: status.as_u16(),
                    body,
                });
            }

            let envelope: ApiEnvelope<ListData> = serde_json::from_str(&body)?;
            if envelope.code == 401 && !reauthed && self.auth().can_authenticate() {
                debug!("Listing page {} rejected in envelope, refreshing token", page);
                self.auth().authenticate().await?;
                reauthed = true;
                continue;
            }
            if envelope.code != 200 {
                return Err(MediaSyncError::ListFailed {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(envelope.data.map(ListData::into_parts).unwrap_or_default());
        }
    }

    /// Convert one listing entry into a catalog record.
    ///
    /// Returns `None` when the entry carries no name. The stored path joins
    /// the directory (trailing slash stripped) with the name and drops the
    /// leading slash; the source URL percent-encodes each segment onto the
    /// public link base. Deterministic: the same entry and directory always
    /// produce the same record.
    pub fn normalize_entry(&self, entry: &RawEntry, dir_path: &str) -> Option<CatalogRecord> {
        let name = entry.name()?;
        let base = dir_path.trim_end_matches('/');
        let full_path = if base.is_empty() {
            format!("/{}", name)
        } else {
            format!("{}/{}", base, name)
        };
        let source_url = self.public_url(&full_path);
        let created_at = entry.modified().and_then(parse_timestamp);

        Some(CatalogRecord {
            path: full_path.trim_start_matches('/').to_string(),
            source_url,
            title: name.to_string(),
            created_at,
        })
    }

    /// Normalize a whole listing, skipping nameless entries.
    pub fn build_catalog(&self, entries: &[RawEntry], dir_path: &str) -> Vec<CatalogRecord> {
        entries
            .iter()
            .filter_map(|entry| self.normalize_entry(entry, dir_path))
            .collect()
    }
}

/// Parse a store timestamp; records keep `None` for unparseable values.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
