//! AnkiConnect implementation of the card store.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::{CardId, CardStore, FieldMap, NewCard, RemoteCard, StoreError};
use crate::config::AnkiConfig;

const API_VERSION: u8 = 6;

#[derive(Debug, Serialize)]
struct Request<'a, P: Serialize> {
    action: &'a str,
    version: u8,
    params: P,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteInfo {
    note_id: CardId,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Deserialize)]
struct FieldValue {
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddNote<'a> {
    deck_name: &'a str,
    model_name: &'a str,
    fields: &'a FieldMap,
    tags: &'a [String],
    options: AddNoteOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddNoteOptions {
    allow_duplicate: bool,
    duplicate_scope: &'static str,
}

/// Client for the AnkiConnect add-on's HTTP API.
pub struct AnkiConnect {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl AnkiConnect {
    pub fn new(config: &AnkiConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn invoke<P, T>(&self, action: &str, params: P) -> Result<T, StoreError>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        tracing::debug!(action, "anki request");

        let request = Request {
            action,
            version: API_VERSION,
            params,
            key: self.api_key.as_deref(),
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                action: action.to_string(),
                message: format!("HTTP {}: {}", status, message),
            });
        }

        let body: Value = resp.json().await.map_err(|e| StoreError::Malformed {
            action: action.to_string(),
            message: e.to_string(),
        })?;

        if let Some(error) = body.get("error").and_then(Value::as_str) {
            return Err(StoreError::Api {
                action: action.to_string(),
                message: error.to_string(),
            });
        }

        let result = body.get("result").cloned().unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|e| StoreError::Malformed {
            action: action.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CardStore for AnkiConnect {
    async fn check_connection(&self) -> Result<(), StoreError> {
        let version: u32 = self.invoke("version", json!({})).await?;
        tracing::debug!(version, "connected to AnkiConnect");
        Ok(())
    }

    async fn model_exists(&self, model: &str) -> Result<bool, StoreError> {
        let models: Vec<String> = self.invoke("modelNames", json!({})).await?;
        Ok(models.iter().any(|m| m == model))
    }

    async fn find_cards(
        &self,
        model: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<RemoteCard>, StoreError> {
        let query = search_query(model, field, value);
        let ids: Vec<CardId> = self.invoke("findNotes", json!({ "query": query })).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let notes: Vec<NoteInfo> = self.invoke("notesInfo", json!({ "notes": ids })).await?;
        Ok(notes
            .into_iter()
            .map(|note| RemoteCard {
                id: note.note_id,
                tags: note.tags,
                fields: note
                    .fields
                    .into_iter()
                    .map(|(name, field)| (name, field.value))
                    .collect(),
            })
            .collect())
    }

    async fn ensure_deck(&self, deck: &str) -> Result<(), StoreError> {
        let _: Value = self.invoke("createDeck", json!({ "deck": deck })).await?;
        Ok(())
    }

    async fn create_card(&self, card: &NewCard) -> Result<CardId, StoreError> {
        let note = AddNote {
            deck_name: &card.deck,
            model_name: &card.model,
            fields: &card.fields,
            tags: &card.tags,
            options: AddNoteOptions {
                allow_duplicate: false,
                duplicate_scope: "deck",
            },
        };
        let id: Option<CardId> = self.invoke("addNote", json!({ "note": note })).await?;
        id.ok_or_else(|| StoreError::Malformed {
            action: "addNote".to_string(),
            message: "no note id returned".to_string(),
        })
    }

    async fn update_card_fields(&self, id: CardId, fields: &FieldMap) -> Result<(), StoreError> {
        self.invoke(
            "updateNoteFields",
            json!({ "note": { "id": id, "fields": fields } }),
        )
        .await
    }

    async fn update_card_tags(
        &self,
        id: CardId,
        add: &[String],
        remove: &[String],
    ) -> Result<(), StoreError> {
        if !add.is_empty() {
            self.invoke::<_, ()>("addTags", json!({ "notes": [id], "tags": add.join(" ") }))
                .await?;
        }
        if !remove.is_empty() {
            self.invoke::<_, ()>("removeTags", json!({ "notes": [id], "tags": remove.join(" ") }))
                .await?;
        }
        Ok(())
    }
}

/// Anki search for one note type and an exact field value.
fn search_query(model: &str, field: &str, value: &str) -> String {
    format!(
        "\"note:{}\" \"{}:{}\"",
        escape_search(model),
        escape_search(field),
        escape_search(value)
    )
}

fn escape_search(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '*' | '_' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
