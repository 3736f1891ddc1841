//! One note through reader, extractor, catalog, assembler and sync client.

use chrono::{DateTime, Utc};
use leetcard_core::{extract, read_header, CardAssembler, NoteSource, TagPolicy};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::error::PipelineError;
use crate::store::CardStore;
use crate::sync::{SyncClient, SyncOutcome};

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub note: PathBuf,
    pub number: u32,
    pub title: String,
    pub outcome: SyncOutcome,
    pub finished_at: DateTime<Utc>,
}

/// Sync pipeline for single notes.
///
/// Nothing is written to the store until every read stage has succeeded.
pub struct Pipeline<S> {
    policy: TagPolicy,
    exclude_tags: Vec<String>,
    assembler: CardAssembler,
    catalog: CatalogClient,
    sync: SyncClient<S>,
    dry_run: bool,
}

impl<S: CardStore> Pipeline<S> {
    pub fn new(config: &Config, store: S) -> Result<Self, PipelineError> {
        let policy = config.tag_policy();
        let catalog = CatalogClient::new(&config.catalog)?;

        Ok(Self {
            exclude_tags: config.sync.exclude_tags.clone(),
            assembler: CardAssembler::new(
                policy.clone(),
                config.card.clone(),
                config.obsidian.clone(),
            ),
            catalog,
            sync: SyncClient::new(store, config.store_target(), policy.clone()),
            policy,
            dry_run: false,
        })
    }

    /// Stop short of writing; report what would change instead.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self, path: &Path) -> Result<SyncReport, PipelineError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PipelineError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let source = NoteSource::parse(path, &contents)?;
        let header = read_header(&source, &self.policy)?;
        let number = header.identity.number;
        tracing::info!(
            number,
            title = %header.identity.title,
            pattern_tags = header.pattern_tags.len(),
            "note read"
        );

        let report = |outcome| SyncReport {
            note: path.to_path_buf(),
            number,
            title: header.identity.title.clone(),
            outcome,
            finished_at: Utc::now(),
        };

        if let Some(tag) = self.excluded_tag(&header.all_tags) {
            tracing::info!(number, %tag, "note carries an excluded tag, skipping");
            return Ok(report(SyncOutcome::Skipped {
                reason: format!("excluded tag `{}`", tag),
            }));
        }

        let fields = extract(&source.body)?;
        tracing::info!(
            number,
            has_derivation = fields.derivation.is_some(),
            "sections extracted"
        );

        let (catalog, lookup) = tokio::try_join!(
            async {
                self.catalog
                    .fetch(&fields.problem_url)
                    .await
                    .map_err(PipelineError::from)
            },
            async {
                self.sync.ping().await?;
                self.sync.lookup(number).await.map_err(PipelineError::from)
            },
        )?;
        tracing::info!(
            number,
            examples = catalog.examples.len(),
            constraints = catalog.constraints.len(),
            "catalog entry fetched"
        );

        let card = self.assembler.assemble(&header, path, &fields, &catalog)?;
        tracing::debug!(number, "card assembled");

        let outcome = if self.dry_run {
            let preview = self.sync.preview(&lookup, &card);
            tracing::info!(number, outcome = ?preview, "dry run, store left untouched");
            preview
        } else {
            self.sync.apply(lookup, &card).await?
        };

        Ok(report(outcome))
    }

    fn excluded_tag<'a>(&self, tags: &'a [String]) -> Option<&'a str> {
        tags.iter()
            .find(|tag| {
                self.exclude_tags
                    .iter()
                    .any(|excluded| excluded.eq_ignore_ascii_case(tag))
            })
            .map(String::as_str)
    }
}
