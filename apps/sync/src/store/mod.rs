//! Flashcard store abstraction.

pub mod anki_connect;

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

pub use anki_connect::AnkiConnect;

/// The store's own note id.
pub type CardId = i64;

/// Field name to field value.
pub type FieldMap = BTreeMap<String, String>;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot reach the store: {0}")]
    Connection(String),

    #[error("store rejected `{action}`: {message}")]
    Api { action: String, message: String },

    #[error("unexpected store response to `{action}`: {message}")]
    Malformed { action: String, message: String },

    #[error("note type `{model}` does not exist in the store; create it before syncing")]
    TemplateMissing { model: String },

    #[error("{} cards exist for problem {number} (ids {ids:?}); remove the duplicates first", .ids.len())]
    DuplicateCard { number: u32, ids: Vec<CardId> },
}

/// A card already in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCard {
    pub id: CardId,
    pub tags: Vec<String>,
    pub fields: FieldMap,
}

/// A card to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub deck: String,
    pub model: String,
    pub fields: FieldMap,
    pub tags: Vec<String>,
}

/// Operations the sync client needs from a flashcard store.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Cheap round trip to confirm the store is reachable.
    async fn check_connection(&self) -> Result<(), StoreError>;

    async fn model_exists(&self, model: &str) -> Result<bool, StoreError>;

    /// Cards of `model` whose `field` equals `value` exactly.
    async fn find_cards(
        &self,
        model: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<RemoteCard>, StoreError>;

    /// Create the deck if it does not exist yet.
    async fn ensure_deck(&self, deck: &str) -> Result<(), StoreError>;

    async fn create_card(&self, card: &NewCard) -> Result<CardId, StoreError>;

    /// Overwrite the given fields; fields not in the map are left alone.
    async fn update_card_fields(&self, id: CardId, fields: &FieldMap) -> Result<(), StoreError>;

    async fn update_card_tags(
        &self,
        id: CardId,
        add: &[String],
        remove: &[String],
    ) -> Result<(), StoreError>;
}
