//! Common test utilities for integration tests.
//!
//! This module provides:
//! - MemoryStore, an in-memory CardStore that records every call
//! - Config and note-file helpers for pipeline tests

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use leetcard_sync::config::Config;
use leetcard_sync::store::{CardId, CardStore, FieldMap, NewCard, RemoteCard, StoreError};

/// A card as the in-memory store holds it.
#[derive(Debug, Clone)]
pub struct StoredCard {
    pub id: CardId,
    pub deck: String,
    pub model: String,
    pub fields: FieldMap,
    pub tags: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    cards: Vec<StoredCard>,
    decks: Vec<String>,
    models: Vec<String>,
    next_id: CardId,
    reachable: bool,
    reads: usize,
    writes: usize,
}

/// In-memory store. Clones share state, so a test can keep one handle and
/// give another to the pipeline.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Empty store that knows the default note type.
    pub fn new() -> Self {
        Self::with_models(&[fixtures::MODEL])
    }

    pub fn with_models(models: &[&str]) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                models: models.iter().map(|m| m.to_string()).collect(),
                next_id: 1_700_000_000_000,
                reachable: true,
                ..State::default()
            })),
        }
    }

    /// Make every call fail as if the store were down.
    pub fn unreachable(self) -> Self {
        self.state.lock().unwrap().reachable = false;
        self
    }

    /// Put a card straight into the store, bypassing the write counter.
    pub fn seed(&self, number: u32, tags: &[&str], extra_fields: &[(&str, &str)]) -> CardId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;

        let mut fields = FieldMap::new();
        fields.insert("ProblemNumber".to_string(), number.to_string());
        for (name, value) in extra_fields {
            fields.insert(name.to_string(), value.to_string());
        }

        state.cards.push(StoredCard {
            id,
            deck: fixtures::DECK.to_string(),
            model: fixtures::MODEL.to_string(),
            fields,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        });
        id
    }

    pub fn cards(&self) -> Vec<StoredCard> {
        self.state.lock().unwrap().cards.clone()
    }

    pub fn card(&self, id: CardId) -> Option<StoredCard> {
        self.cards().into_iter().find(|c| c.id == id)
    }

    pub fn decks(&self) -> Vec<String> {
        self.state.lock().unwrap().decks.clone()
    }

    /// Number of calls of any kind.
    pub fn calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.reads + state.writes
    }

    /// Number of mutating calls.
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    fn read(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        if !state.reachable {
            return Err(StoreError::Connection("connection refused".to_string()));
        }
        Ok(state)
    }

    fn write(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        if !state.reachable {
            return Err(StoreError::Connection("connection refused".to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn check_connection(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }

    async fn model_exists(&self, model: &str) -> Result<bool, StoreError> {
        Ok(self.read()?.models.iter().any(|m| m == model))
    }

    async fn find_cards(
        &self,
        model: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<RemoteCard>, StoreError> {
        let state = self.read()?;
        Ok(state
            .cards
            .iter()
            .filter(|c| c.model == model && c.fields.get(field).map(String::as_str) == Some(value))
            .map(|c| RemoteCard {
                id: c.id,
                tags: c.tags.clone(),
                fields: c.fields.clone(),
            })
            .collect())
    }

    async fn ensure_deck(&self, deck: &str) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.decks.iter().any(|d| d == deck) {
            state.decks.push(deck.to_string());
        }
        Ok(())
    }

    async fn create_card(&self, card: &NewCard) -> Result<CardId, StoreError> {
        let mut state = self.write()?;
        let id = state.next_id;
        state.next_id += 1;
        state.cards.push(StoredCard {
            id,
            deck: card.deck.clone(),
            model: card.model.clone(),
            fields: card.fields.clone(),
            tags: card.tags.clone(),
        });
        Ok(id)
    }

    async fn update_card_fields(&self, id: CardId, fields: &FieldMap) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let card = state
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::Api {
                action: "updateNoteFields".to_string(),
                message: "note was not found".to_string(),
            })?;
        for (name, value) in fields {
            card.fields.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    async fn update_card_tags(
        &self,
        id: CardId,
        add: &[String],
        remove: &[String],
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let card = state
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::Api {
                action: "addTags".to_string(),
                message: "note was not found".to_string(),
            })?;
        card.tags
            .retain(|t| !remove.iter().any(|r| r.eq_ignore_ascii_case(t)));
        card.tags.extend(add.iter().cloned());
        Ok(())
    }
}

/// Config pointing the catalog at a mock server, with no retry delay.
pub fn test_config(graphql_url: &str) -> Config {
    let mut config = Config::default();
    config.catalog.graphql_url = graphql_url.to_string();
    config.catalog.retry_backoff_ms = 0;
    config
}

/// Write a note into `dir` and return its path.
pub fn write_note(dir: &TempDir, file_name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn note_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}
