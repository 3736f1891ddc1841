//! Find-or-create upsert of a rendered card, keyed by problem number.

use leetcard_core::{field, CardFields, PatternTags, TagPolicy};
use serde::Serialize;

use crate::store::{CardId, CardStore, FieldMap, NewCard, RemoteCard, StoreError};

/// Where new cards go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTarget {
    pub deck: String,
    pub model: String,
}

/// Result of looking a problem number up in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Absent,
    Existing(RemoteCard),
}

/// What a run did, or would have done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum SyncOutcome {
    Created {
        card_id: CardId,
    },
    Updated {
        card_id: CardId,
        fields_changed: Vec<String>,
        tags_added: Vec<String>,
        tags_removed: Vec<String>,
    },
    Unchanged {
        card_id: CardId,
    },
    Skipped {
        reason: String,
    },
    DryRun {
        would_create: bool,
        card_id: Option<CardId>,
        fields: Vec<String>,
    },
}

impl SyncOutcome {
    pub fn card_id(&self) -> Option<CardId> {
        match self {
            Self::Created { card_id }
            | Self::Updated { card_id, .. }
            | Self::Unchanged { card_id } => Some(*card_id),
            Self::DryRun { card_id, .. } => *card_id,
            Self::Skipped { .. } => None,
        }
    }
}

/// Tag edits needed to bring a card in line with the note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagChanges {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl TagChanges {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Applies rendered cards to a [`CardStore`].
pub struct SyncClient<S> {
    store: S,
    target: StoreTarget,
    policy: TagPolicy,
}

impl<S: CardStore> SyncClient<S> {
    pub fn new(store: S, target: StoreTarget, policy: TagPolicy) -> Self {
        Self {
            store,
            target,
            policy,
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.check_connection().await
    }

    /// Find the card for `number`. More than one match is an error.
    pub async fn lookup(&self, number: u32) -> Result<Lookup, StoreError> {
        let mut cards = self
            .store
            .find_cards(&self.target.model, field::IDENTITY, &number.to_string())
            .await?;

        match cards.len() {
            0 => Ok(Lookup::Absent),
            1 => Ok(Lookup::Existing(cards.remove(0))),
            _ => Err(StoreError::DuplicateCard {
                number,
                ids: cards.into_iter().map(|c| c.id).collect(),
            }),
        }
    }

    /// Create or update according to a previous [`lookup`](Self::lookup).
    pub async fn apply(&self, lookup: Lookup, card: &CardFields) -> Result<SyncOutcome, StoreError> {
        match lookup {
            Lookup::Absent => self.create(card).await,
            Lookup::Existing(remote) => self.update(&remote, card).await,
        }
    }

    pub async fn upsert(&self, card: &CardFields) -> Result<SyncOutcome, StoreError> {
        let lookup = self.lookup(card.number).await?;
        self.apply(lookup, card).await
    }

    /// Describe what [`apply`](Self::apply) would write, without writing.
    pub fn preview(&self, lookup: &Lookup, card: &CardFields) -> SyncOutcome {
        let desired = card.to_field_map();
        match lookup {
            Lookup::Absent => SyncOutcome::DryRun {
                would_create: true,
                card_id: None,
                fields: desired.into_keys().collect(),
            },
            Lookup::Existing(remote) => SyncOutcome::DryRun {
                would_create: false,
                card_id: Some(remote.id),
                fields: changed_fields(&remote.fields, &desired).into_keys().collect(),
            },
        }
    }

    async fn create(&self, card: &CardFields) -> Result<SyncOutcome, StoreError> {
        if !self.store.model_exists(&self.target.model).await? {
            return Err(StoreError::TemplateMissing {
                model: self.target.model.clone(),
            });
        }

        self.store.ensure_deck(&self.target.deck).await?;

        let new_card = NewCard {
            deck: self.target.deck.clone(),
            model: self.target.model.clone(),
            fields: card.to_field_map(),
            tags: card.tags.to_vec(),
        };
        let card_id = self.store.create_card(&new_card).await?;

        tracing::info!(card_id, number = card.number, deck = %self.target.deck, "card created");
        Ok(SyncOutcome::Created { card_id })
    }

    async fn update(&self, remote: &RemoteCard, card: &CardFields) -> Result<SyncOutcome, StoreError> {
        let fields = changed_fields(&remote.fields, &card.to_field_map());
        let tags = plan_tag_changes(&remote.tags, &card.tags, &self.policy);

        if fields.is_empty() && tags.is_empty() {
            tracing::info!(card_id = remote.id, number = card.number, "card already up to date");
            return Ok(SyncOutcome::Unchanged { card_id: remote.id });
        }

        if !fields.is_empty() {
            self.store.update_card_fields(remote.id, &fields).await?;
        }
        if !tags.is_empty() {
            self.store
                .update_card_tags(remote.id, &tags.add, &tags.remove)
                .await?;
        }

        let fields_changed: Vec<String> = fields.into_keys().collect();
        tracing::info!(
            card_id = remote.id,
            number = card.number,
            fields = ?fields_changed,
            tags_added = ?tags.add,
            tags_removed = ?tags.remove,
            "card updated"
        );

        Ok(SyncOutcome::Updated {
            card_id: remote.id,
            fields_changed,
            tags_added: tags.add,
            tags_removed: tags.remove,
        })
    }
}

/// Fields in `desired` whose stored value is missing or different.
pub fn changed_fields(current: &FieldMap, desired: &FieldMap) -> FieldMap {
    desired
        .iter()
        .filter(|(name, value)| current.get(*name) != Some(*value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Reconcile a card's tags with the note's pattern tags.
///
/// Only tags under an allowed prefix are ever removed. Tags and prefixes
/// compare case-insensitively, as Anki does.
pub fn plan_tag_changes(current: &[String], desired: &PatternTags, policy: &TagPolicy) -> TagChanges {
    let wanted = desired.to_vec();

    let add = wanted
        .iter()
        .filter(|tag| !contains_tag(current, tag))
        .cloned()
        .collect();

    let remove = current
        .iter()
        .filter(|tag| policy.allows_ignore_case(tag) && !contains_tag(&wanted, tag))
        .cloned()
        .collect();

    TagChanges { add, remove }
}

fn contains_tag(tags: &[String], tag: &str) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
}
