//! Pipeline error type.

use leetcard_core::NoteError;
use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Any failure of a sync run, displayed as `<stage>: <detail>`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("note reader: cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {}", .0.stage(), .0)]
    Note(#[from] NoteError),

    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{}: {}", store_stage(.0), .0)]
    Store(#[from] StoreError),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Client(_) => "http client",
            Self::Io { .. } => "note reader",
            Self::Note(e) => e.stage(),
            Self::Catalog(_) => "catalog client",
            Self::Store(e) => store_stage(e),
        }
    }
}

fn store_stage(error: &StoreError) -> &'static str {
    match error {
        StoreError::Connection(_) => "store connection",
        _ => "sync client",
    }
}
