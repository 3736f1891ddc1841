//! Sync LeetCode problem notes into Anki cards.
//!
//! The pure note handling lives in `leetcard-core`; this crate adds the
//! configuration, the catalog and store clients and the CLI around it.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod sync;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::PipelineError;
use crate::pipeline::{Pipeline, SyncReport};
use crate::store::AnkiConnect;

pub use crate::sync::SyncOutcome;

pub async fn run(cli: Cli) -> anyhow::Result<SyncReport> {
    dotenvy::dotenv().ok();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref()).map_err(PipelineError::from)?;
    tracing::debug!(
        anki = %config.anki.url,
        deck = %config.anki.deck_name,
        catalog = %config.catalog.graphql_url,
        "configuration loaded"
    );

    let store = AnkiConnect::new(&config.anki).map_err(PipelineError::from)?;
    let pipeline = Pipeline::new(&config, store)?.with_dry_run(cli.dry_run);

    let report = pipeline.run(&cli.note).await?;
    Ok(report)
}
