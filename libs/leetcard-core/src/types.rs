//! Core types for the note-to-card pipeline.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Field names of the card note type, in template order.
pub mod field {
    pub const PROBLEM_NUMBER: &str = "ProblemNumber";
    pub const PROBLEM_TITLE: &str = "ProblemTitle";
    pub const PROBLEM_DESCRIPTION: &str = "ProblemDescription";
    pub const PROBLEM_EXAMPLES: &str = "ProblemExamples";
    pub const PROBLEM_CONSTRAINTS: &str = "ProblemConstraints";
    pub const PATTERN_TAGS_FRONT: &str = "PatternTagsFront";
    pub const PATTERN_TAGS_BACK: &str = "PatternTagsBack";
    pub const KEY_INSIGHT: &str = "KeyInsight";
    pub const DERIVATION: &str = "Derivation";
    pub const ALGORITHM: &str = "Algorithm";
    pub const COMPLEXITY: &str = "Complexity";
    pub const LEETCODE_LINK: &str = "LeetCodeLink";
    pub const OBSIDIAN_LINK: &str = "ObsidianLink";

    /// Identity field used to find an existing card.
    pub const IDENTITY: &str = PROBLEM_NUMBER;
}

/// A note file split into its frontmatter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSource {
    pub path: PathBuf,
    pub frontmatter: String,
    pub body: String,
}

/// Problem number and title taken from the note's file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemIdentity {
    pub number: u32,
    pub title: String,
}

/// Frontmatter tags that carry an allowed prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternTags(BTreeSet<String>);

impl PatternTags {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags as an owned, sorted list.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PatternTags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Required note sections, as named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Link,
    KeyInsight,
    Algorithm,
    Complexity,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::KeyInsight => "key insight",
            Self::Algorithm => "algorithm",
            Self::Complexity => "complexity",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markdown regions pulled out of the note body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub problem_url: String,
    pub key_insight: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<String>,
    pub algorithm: String,
    pub complexity: String,
}

/// One worked example from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Problem statement fetched from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogData {
    /// Statement HTML, without examples and constraints.
    pub description: String,
    pub examples: Vec<Example>,
    /// Inner HTML of each constraint item.
    pub constraints: Vec<String>,
}

/// Rendered card payload, in the store's field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardFields {
    pub number: u32,
    pub tags: PatternTags,
    pub problem_title: String,
    pub problem_description: String,
    pub problem_examples: String,
    pub problem_constraints: String,
    pub pattern_tags_front: String,
    pub pattern_tags_back: String,
    pub key_insight: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<String>,
    pub algorithm: String,
    pub complexity: String,
    pub leetcode_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obsidian_link: Option<String>,
}

impl CardFields {
    /// Field name to value, leaving out fields that are absent.
    pub fn to_field_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        let mut put = |name: &str, value: &str| {
            map.insert(name.to_string(), value.to_string());
        };

        put(field::PROBLEM_NUMBER, &self.number.to_string());
        put(field::PROBLEM_TITLE, &self.problem_title);
        put(field::PROBLEM_DESCRIPTION, &self.problem_description);
        put(field::PROBLEM_EXAMPLES, &self.problem_examples);
        put(field::PROBLEM_CONSTRAINTS, &self.problem_constraints);
        put(field::PATTERN_TAGS_FRONT, &self.pattern_tags_front);
        put(field::PATTERN_TAGS_BACK, &self.pattern_tags_back);
        put(field::KEY_INSIGHT, &self.key_insight);
        if let Some(derivation) = &self.derivation {
            put(field::DERIVATION, derivation);
        }
        put(field::ALGORITHM, &self.algorithm);
        put(field::COMPLEXITY, &self.complexity);
        put(field::LEETCODE_LINK, &self.leetcode_link);
        if let Some(link) = &self.obsidian_link {
            put(field::OBSIDIAN_LINK, link);
        }

        map
    }
}
