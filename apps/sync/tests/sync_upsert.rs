//! Sync client tests against the in-memory store.

mod common;

use pretty_assertions::assert_eq;

use common::fixtures::{DECK, MODEL};
use common::MemoryStore;
use leetcard_core::{CardFields, PatternTags, TagPolicy};
use leetcard_sync::store::StoreError;
use leetcard_sync::sync::{Lookup, StoreTarget, SyncClient, SyncOutcome};

fn client(store: MemoryStore) -> SyncClient<MemoryStore> {
    SyncClient::new(
        store,
        StoreTarget {
            deck: DECK.to_string(),
            model: MODEL.to_string(),
        },
        TagPolicy::new(["algorithm/", "data-structure/"]),
    )
}

fn card(tags: &[&str]) -> CardFields {
    CardFields {
        number: 42,
        tags: tags.iter().copied().collect::<PatternTags>(),
        problem_title: "Trapping Rain Water".to_string(),
        problem_description: "<p>Compute trapped water.</p>".to_string(),
        problem_examples: String::new(),
        problem_constraints: String::new(),
        pattern_tags_front: String::new(),
        pattern_tags_back: "<span class=\"pattern-tag\">two-pointer</span>".to_string(),
        key_insight: "Bounded by the lower max.".to_string(),
        derivation: None,
        algorithm: "<ol class=\"algorithm-steps\"><li class=\"algorithm-item\">Scan.</li></ol>"
            .to_string(),
        complexity: "Time: O(n), Space: O(1)".to_string(),
        leetcode_link: "https://leetcode.com/problems/trapping-rain-water/".to_string(),
        obsidian_link: None,
    }
}

/// Test first upsert creates the card in the configured deck.
#[tokio::test]
async fn test_upsert_creates_card() {
    let store = MemoryStore::new();
    let sync = client(store.clone());

    let outcome = sync
        .upsert(&card(&["algorithm/two-pointer", "data-structure/array"]))
        .await
        .unwrap();

    let SyncOutcome::Created { card_id } = outcome else {
        panic!("expected Created, got {:?}", outcome);
    };
    let stored = store.card(card_id).unwrap();
    assert_eq!(stored.deck, DECK);
    assert_eq!(stored.model, MODEL);
    assert_eq!(stored.fields["ProblemNumber"], "42");
    assert!(!stored.fields.contains_key("Derivation"));
    assert_eq!(
        stored.tags,
        vec!["algorithm/two-pointer".to_string(), "data-structure/array".to_string()]
    );
    assert_eq!(store.decks(), vec![DECK.to_string()]);
}

/// Test a second upsert of the same card writes nothing.
#[tokio::test]
async fn test_upsert_is_idempotent() {
    let store = MemoryStore::new();
    let sync = client(store.clone());
    let fields = card(&["algorithm/two-pointer"]);

    let first = sync.upsert(&fields).await.unwrap();
    let writes_after_create = store.writes();
    let second = sync.upsert(&fields).await.unwrap();

    assert_eq!(second, SyncOutcome::Unchanged {
        card_id: first.card_id().unwrap()
    });
    assert_eq!(store.writes(), writes_after_create);
    assert_eq!(store.cards().len(), 1);
}

/// Test only changed fields are sent on update.
#[tokio::test]
async fn test_update_sends_changed_fields_only() {
    let store = MemoryStore::new();
    let sync = client(store.clone());

    sync.upsert(&card(&["algorithm/two-pointer"])).await.unwrap();

    let mut edited = card(&["algorithm/two-pointer"]);
    edited.key_insight = "Each bar holds min(maxL, maxR) - h.".to_string();
    let outcome = sync.upsert(&edited).await.unwrap();

    match outcome {
        SyncOutcome::Updated {
            card_id,
            fields_changed,
            tags_added,
            tags_removed,
        } => {
            assert_eq!(fields_changed, vec!["KeyInsight".to_string()]);
            assert!(tags_added.is_empty());
            assert!(tags_removed.is_empty());
            assert_eq!(
                store.card(card_id).unwrap().fields["KeyInsight"],
                "Each bar holds min(maxL, maxR) - h."
            );
        }
        other => panic!("expected Updated, got {:?}", other),
    }
}

/// Test removed pattern tags leave the card; unmanaged tags stay.
#[tokio::test]
async fn test_tag_reconciliation_keeps_unmanaged_tags() {
    let store = MemoryStore::new();
    let id = store.seed(
        42,
        &["algorithm/two-pointer", "algorithm/stack", "leech", "favourite"],
        &[],
    );
    let sync = client(store.clone());

    let outcome = sync
        .upsert(&card(&["algorithm/two-pointer", "data-structure/array"]))
        .await
        .unwrap();

    match outcome {
        SyncOutcome::Updated {
            tags_added,
            tags_removed,
            ..
        } => {
            assert_eq!(tags_added, vec!["data-structure/array".to_string()]);
            assert_eq!(tags_removed, vec!["algorithm/stack".to_string()]);
        }
        other => panic!("expected Updated, got {:?}", other),
    }

    let mut tags = store.card(id).unwrap().tags;
    tags.sort();
    assert_eq!(
        tags,
        vec![
            "algorithm/two-pointer".to_string(),
            "data-structure/array".to_string(),
            "favourite".to_string(),
            "leech".to_string(),
        ]
    );
}

/// Test two cards with one number are refused without a write.
#[tokio::test]
async fn test_duplicate_cards_are_refused() {
    let store = MemoryStore::new();
    let first = store.seed(42, &[], &[]);
    let second = store.seed(42, &[], &[]);
    let sync = client(store.clone());

    let err = sync.upsert(&card(&[])).await.unwrap_err();

    match err {
        StoreError::DuplicateCard { number, ids } => {
            assert_eq!(number, 42);
            assert_eq!(ids, vec![first, second]);
        }
        other => panic!("expected DuplicateCard, got {:?}", other),
    }
    assert_eq!(store.writes(), 0);
}

/// Test a missing note type fails the create without a write.
#[tokio::test]
async fn test_missing_template_fails_create() {
    let store = MemoryStore::with_models(&["Basic"]);
    let sync = client(store.clone());

    let err = sync.upsert(&card(&[])).await.unwrap_err();

    assert!(matches!(err, StoreError::TemplateMissing { ref model } if model == MODEL));
    assert_eq!(store.writes(), 0);
    assert!(store.cards().is_empty());
}

/// Test preview reports the change set and leaves the store alone.
#[tokio::test]
async fn test_preview_does_not_write() {
    let store = MemoryStore::new();
    let id = store.seed(42, &[], &[("ProblemTitle", "Trapping Rain Water")]);
    let sync = client(store.clone());

    let lookup = sync.lookup(42).await.unwrap();
    assert!(matches!(lookup, Lookup::Existing(ref c) if c.id == id));

    let preview = sync.preview(&lookup, &card(&[]));
    match preview {
        SyncOutcome::DryRun {
            would_create,
            card_id,
            fields,
        } => {
            assert!(!would_create);
            assert_eq!(card_id, Some(id));
            assert!(!fields.contains(&"ProblemTitle".to_string()));
            assert!(fields.contains(&"KeyInsight".to_string()));
        }
        other => panic!("expected DryRun, got {:?}", other),
    }
    assert_eq!(store.writes(), 0);
}
