//! Card assembler: merges note fields and catalog data into card fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{NoteError, Result};
use crate::frontmatter::{NoteHeader, TagPolicy};
use crate::markdown::{self, escape_html, ListClasses, MathDelimiters};
use crate::types::{CardFields, CatalogData, Example, ExtractedFields, PatternTags};

/// Obsidian vault the notes live in, for deep links back to the note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObsidianVault {
    pub vault_name: String,
    pub vault_path: PathBuf,
}

/// Card rendering switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub math_delimiters: MathDelimiters,
    /// Show pattern tags on the front of the card as well as the back.
    pub show_tags: bool,
    pub show_leetcode_link: bool,
    pub max_tags_display: Option<usize>,
    pub max_examples: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            math_delimiters: MathDelimiters::default(),
            show_tags: false,
            show_leetcode_link: true,
            max_tags_display: None,
            max_examples: None,
        }
    }
}

/// Builds card payloads from a note and its catalog entry.
#[derive(Debug, Clone, Default)]
pub struct CardAssembler {
    policy: TagPolicy,
    options: RenderOptions,
    vault: Option<ObsidianVault>,
}

impl CardAssembler {
    pub fn new(policy: TagPolicy, options: RenderOptions, vault: Option<ObsidianVault>) -> Self {
        Self {
            policy,
            options,
            vault,
        }
    }

    /// Merge everything into the card payload.
    ///
    /// Fails with `IncompleteField` when a required input is blank; nothing
    /// is filled in with placeholder text.
    pub fn assemble(
        &self,
        header: &NoteHeader,
        note_path: &Path,
        fields: &ExtractedFields,
        catalog: &CatalogData,
    ) -> Result<CardFields> {
        require("title", &header.identity.title)?;
        require("problem url", &fields.problem_url)?;
        require("key insight", &fields.key_insight)?;
        require("algorithm", &fields.algorithm)?;
        require("complexity", &fields.complexity)?;
        require("description", &catalog.description)?;

        let math = self.options.math_delimiters;
        let chips = self.tag_chips(&header.pattern_tags);

        Ok(CardFields {
            number: header.identity.number,
            tags: header.pattern_tags.clone(),
            problem_title: escape_html(&header.identity.title),
            problem_description: catalog.description.clone(),
            problem_examples: self.render_examples(&catalog.examples),
            problem_constraints: render_constraints(&catalog.constraints),
            pattern_tags_front: if self.options.show_tags {
                chips.clone()
            } else {
                String::new()
            },
            pattern_tags_back: chips,
            key_insight: markdown::render(&fields.key_insight, math, ListClasses::default()),
            derivation: fields
                .derivation
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(|d| markdown::render(d, math, ListClasses::DERIVATION)),
            algorithm: markdown::render(&fields.algorithm, math, ListClasses::ALGORITHM),
            complexity: markdown::render(&fields.complexity, math, ListClasses::default()),
            leetcode_link: if self.options.show_leetcode_link {
                fields.problem_url.clone()
            } else {
                String::new()
            },
            obsidian_link: self.vault.as_ref().map(|v| obsidian_link(v, note_path)),
        })
    }

    fn tag_chips(&self, tags: &PatternTags) -> String {
        let limit = self.options.max_tags_display.unwrap_or(usize::MAX);
        tags.iter()
            .take(limit)
            .map(|tag| {
                format!(
                    "<span class=\"pattern-tag\">{}</span>",
                    escape_html(self.policy.display_name(tag))
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render_examples(&self, examples: &[Example]) -> String {
        let limit = self.options.max_examples.unwrap_or(usize::MAX);
        examples
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, example)| {
                let mut content = format!(
                    "<strong>Input:</strong> {}<br><strong>Output:</strong> {}",
                    escape_html(&example.input),
                    escape_html(&example.output)
                );
                if let Some(explanation) = &example.explanation {
                    content.push_str(&format!(
                        "<br><strong>Explanation:</strong> {}",
                        escape_html(explanation)
                    ));
                }
                format!(
                    "<div class=\"example-block\">\n    <div class=\"example-header\">Example {}:</div>\n    <div class=\"example-content\">{}</div>\n</div>",
                    i + 1,
                    content
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn require(name: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NoteError::IncompleteField(name));
    }
    Ok(())
}

fn render_constraints(constraints: &[String]) -> String {
    if constraints.is_empty() {
        return String::new();
    }
    let items: Vec<String> = constraints
        .iter()
        .map(|c| format!("<li>{}</li>", c))
        .collect();
    format!("<ul>\n{}\n</ul>", items.join("\n"))
}

/// `obsidian://open` URI for the note, relative to the vault when possible.
fn obsidian_link(vault: &ObsidianVault, note_path: &Path) -> String {
    let relative = note_path
        .strip_prefix(&vault.vault_path)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| note_path.file_name().map(PathBuf::from).unwrap_or_default());
    let file: Vec<String> = relative
        .components()
        .map(|part| urlencoding::encode(&part.as_os_str().to_string_lossy()).into_owned())
        .collect();

    format!(
        "obsidian://open?vault={}&file={}",
        urlencoding::encode(&vault.vault_name),
        file.join("/")
    )
}
