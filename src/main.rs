//! MediaSync - sync a media catalog from an OpenList-compatible file store
//! and resolve direct download URLs.

mod auth;
mod cli;
mod config;
mod error;
mod filestore;

use std::io::Write;

use clap::Parser;
use cli::{Args, Command};
use config::Settings;
use filestore::FileStoreClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting mediasync");

    let mut settings = Settings::from_env();
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(dir) = args.dir {
        settings.dir_path = dir;
    }

    let client = FileStoreClient::new(&settings)?;

    match args.command {
        Command::Sync => {
            tracing::info!("Fetching entries from file store dir={}", settings.dir_path);
            let entries = client.fetch_all_pages(&settings.dir_path).await?;
            let records = client.build_catalog(&entries, &settings.dir_path);
            tracing::info!(
                "Fetched {} entries, {} catalog records",
                entries.len(),
                records.len(),
            );

            let mut stdout = std::io::stdout().lock();
            for record in &records {
                serde_json::to_writer(&mut stdout, record)?;
                writeln!(stdout)?;
            }
        }
        Command::Resolve { path } => {
            let resolved = client.resolve_download_url(&path).await?;
            println!("{}", resolved.value);
        }
    }

    Ok(())
}
