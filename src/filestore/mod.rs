//! Client for the remote file store.
//!
//! The store speaks an OpenList-compatible API: `{code, data}` envelopes,
//! paged `/api/fs/list` responses, a direct-link endpoint that may redirect,
//! answer JSON or serve HTML, and a `/api/fs/get` fallback. Collaborators
//! consume two operations: [`FileStoreClient::fetch_all_pages`] and
//! [`FileStoreClient::resolve_download_url`].

pub mod client;
pub mod list;
pub mod resolve;
pub mod types;

pub use client::FileStoreClient;
pub use resolve::{ResolvedUrl, Strategy};
pub use types::{CatalogRecord, RawEntry};
