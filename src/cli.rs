//! Clap config
use clap::{Parser, Subcommand};

/// MediaSync - catalog sync and download-URL resolution for file stores.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// File store base URL (overrides MEDIASYNC_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory path to catalog (overrides MEDIASYNC_DIR)
    #[arg(long)]
    pub dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the configured directory and emit catalog records as JSON lines
    Sync,
    /// Resolve a direct download URL for a stored path
    Resolve {
        /// Path of the file within the store
        path: String,
    },
}
