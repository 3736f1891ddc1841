//! Frontmatter and file name reader.
//!
//! # Format
//! ```markdown
//! ---
//! tags:
//!   - algorithm/two-pointer
//!   - data-structure/array
//! ---
//! 🔗 [LeetCode](https://leetcode.com/problems/trapping-rain-water/)
//! ...
//! ```
//!
//! The file itself must be named `<number>. <title>.md`.

use regex::Regex;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{NoteError, Result};
use crate::types::{NoteSource, PatternTags, ProblemIdentity};

static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.+)\.md$").unwrap());

const DELIMITER: &str = "---";

/// Allowed tag prefixes for pattern tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPolicy {
    prefixes: Vec<String>,
}

impl TagPolicy {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the tag starts with one of the allowed prefixes.
    pub fn allows(&self, tag: &str) -> bool {
        self.prefixes.iter().any(|p| tag.starts_with(p.as_str()))
    }

    /// Like [`allows`](Self::allows), ignoring ASCII case. Store tags
    /// may differ in case from the note's.
    pub fn allows_ignore_case(&self, tag: &str) -> bool {
        self.prefixes.iter().any(|p| {
            tag.get(..p.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(p))
        })
    }

    /// Tag with its allowed prefix removed, for display.
    pub fn display_name<'a>(&self, tag: &'a str) -> &'a str {
        self.prefixes
            .iter()
            .find_map(|p| tag.strip_prefix(p.as_str()))
            .unwrap_or(tag)
    }

    /// Keep only the allowed tags.
    pub fn filter<'a, I>(&self, tags: I) -> PatternTags
    where
        I: IntoIterator<Item = &'a String>,
    {
        tags.into_iter()
            .filter(|t| self.allows(t))
            .cloned()
            .collect()
    }
}

/// Everything the reader derives from a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHeader {
    pub identity: ProblemIdentity,
    pub pattern_tags: PatternTags,
    /// Every frontmatter tag, allowed or not.
    pub all_tags: Vec<String>,
}

impl NoteSource {
    /// Split raw file contents into frontmatter and body.
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Result<Self> {
        let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
        let mut lines = contents.lines();

        match lines.next() {
            Some(first) if first.trim_end() == DELIMITER => {}
            _ => {
                return Err(NoteError::MalformedFrontmatter(
                    "note does not start with a `---` frontmatter block".to_string(),
                ))
            }
        }

        let mut frontmatter = Vec::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line.trim_end() == DELIMITER {
                closed = true;
                break;
            }
            frontmatter.push(line);
        }

        if !closed {
            return Err(NoteError::MalformedFrontmatter(
                "frontmatter block is not closed with `---`".to_string(),
            ));
        }

        Ok(Self {
            path: path.into(),
            frontmatter: frontmatter.join("\n"),
            body: lines.collect::<Vec<_>>().join("\n"),
        })
    }
}

/// Read identity and tags from a note.
pub fn read_header(source: &NoteSource, policy: &TagPolicy) -> Result<NoteHeader> {
    let identity = read_identity(&source.path)?;
    let all_tags = read_tags(&source.frontmatter)?;
    let pattern_tags = policy.filter(&all_tags);

    Ok(NoteHeader {
        identity,
        pattern_tags,
        all_tags,
    })
}

/// Parse `<number>. <title>.md` from the file name.
pub fn read_identity(path: &Path) -> Result<ProblemIdentity> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let invalid = || NoteError::InvalidFilename {
        name: name.to_string(),
    };

    let caps = FILENAME_RE.captures(name).ok_or_else(invalid)?;
    let number = caps[1].parse::<u32>().map_err(|_| invalid())?;
    let title = caps[2].trim();

    if number == 0 || title.is_empty() {
        return Err(invalid());
    }

    Ok(ProblemIdentity {
        number,
        title: title.to_string(),
    })
}

/// Parse the frontmatter YAML and return its `tags` list.
pub fn read_tags(frontmatter: &str) -> Result<Vec<String>> {
    let value: Value = serde_yaml::from_str(frontmatter)
        .map_err(|e| NoteError::MalformedFrontmatter(e.to_string()))?;

    let tags = match value.get("tags") {
        Some(Value::Sequence(items)) => items,
        Some(_) => {
            return Err(NoteError::MalformedFrontmatter(
                "`tags` is not a list".to_string(),
            ))
        }
        None => {
            return Err(NoteError::MalformedFrontmatter(
                "`tags` is missing".to_string(),
            ))
        }
    };

    tags.iter()
        .map(|tag| match tag {
            Value::String(s) => Ok(s.trim().to_string()),
            other => Err(NoteError::MalformedFrontmatter(format!(
                "tag {:?} is not a string",
                other
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn policy() -> TagPolicy {
        TagPolicy::new(["algorithm/", "data-structure/"])
    }

    #[test]
    fn identity_from_filename() {
        let id = read_identity(Path::new("notes/42. Trapping Rain Water.md")).unwrap();
        assert_eq!(id.number, 42);
        assert_eq!(id.title, "Trapping Rain Water");
    }

    #[test]
    fn identity_title_is_trimmed() {
        let id = read_identity(Path::new("7.   Reverse Integer  .md")).unwrap();
        assert_eq!(id.title, "Reverse Integer");
    }

    #[test]
    fn reject_filename_without_number() {
        let result = read_identity(Path::new("Two Sum.md"));
        assert!(matches!(result, Err(NoteError::InvalidFilename { .. })));
    }

    #[test]
    fn reject_filename_with_blank_title() {
        let result = read_identity(Path::new("1.  .md"));
        assert!(matches!(result, Err(NoteError::InvalidFilename { .. })));
    }

    #[test]
    fn reject_zero_problem_number() {
        let result = read_identity(Path::new("0. Nothing.md"));
        assert!(matches!(result, Err(NoteError::InvalidFilename { .. })));
    }

    #[test]
    fn reject_non_markdown_file() {
        let result = read_identity(Path::new("1. Two Sum.txt"));
        assert!(matches!(result, Err(NoteError::InvalidFilename { .. })));
    }

    #[test]
    fn split_frontmatter_and_body() {
        let source = NoteSource::parse("1. Two Sum.md", "---\ntags: [a]\n---\nbody line\nmore").unwrap();
        assert_eq!(source.frontmatter, "tags: [a]");
        assert_eq!(source.body, "body line\nmore");
    }

    #[test]
    fn reject_note_without_frontmatter() {
        let result = NoteSource::parse("1. Two Sum.md", "# Two Sum\n");
        assert!(matches!(result, Err(NoteError::MalformedFrontmatter(_))));
    }

    #[test]
    fn reject_unclosed_frontmatter() {
        let result = NoteSource::parse("1. Two Sum.md", "---\ntags: []\nbody");
        assert!(matches!(result, Err(NoteError::MalformedFrontmatter(_))));
    }

    #[test]
    fn reject_missing_tags() {
        let result = read_tags("title: Two Sum");
        assert!(matches!(result, Err(NoteError::MalformedFrontmatter(_))));
    }

    #[test]
    fn reject_scalar_tags() {
        let result = read_tags("tags: algorithm/hash-map");
        assert!(matches!(result, Err(NoteError::MalformedFrontmatter(_))));
    }

    #[test]
    fn reject_invalid_yaml() {
        let result = read_tags("tags: [unclosed");
        assert!(matches!(result, Err(NoteError::MalformedFrontmatter(_))));
    }

    #[test]
    fn pattern_tags_keep_only_allowed_prefixes() {
        let source = NoteSource::parse(
            "42. Trapping Rain Water.md",
            "---\ntags:\n  - algorithm/two-pointer\n  - data-structure/array\n  - leetcode/hard\n  - algorithm/two-pointer\n---\n",
        )
        .unwrap();

        let header = read_header(&source, &policy()).unwrap();
        assert_eq!(
            header.pattern_tags.to_vec(),
            vec!["algorithm/two-pointer".to_string(), "data-structure/array".to_string()]
        );
        assert_eq!(header.all_tags.len(), 4);
    }

    #[test]
    fn prefix_must_lead_the_tag() {
        assert!(!policy().allows("notes/algorithm/dp"));
        assert!(policy().allows("algorithm/dp"));
    }

    #[test]
    fn store_tags_match_prefix_in_any_case() {
        assert!(!policy().allows("Algorithm/DP"));
        assert!(policy().allows_ignore_case("Algorithm/DP"));
        assert!(!policy().allows_ignore_case("algo"));
        assert!(!policy().allows_ignore_case("notes/algorithm/dp"));
    }

    #[test]
    fn display_name_strips_prefix() {
        assert_eq!(policy().display_name("algorithm/two-pointer"), "two-pointer");
        assert_eq!(policy().display_name("misc"), "misc");
    }
}
