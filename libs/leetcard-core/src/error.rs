//! Error types for leetcard-core.

use thiserror::Error;

use crate::types::Section;

/// Result type alias using NoteError.
pub type Result<T> = std::result::Result<T, NoteError>;

/// Errors that can occur while turning a note into card fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteError {
    #[error("file name {name:?} does not match `<number>. <title>.md`")]
    InvalidFilename { name: String },

    #[error("malformed frontmatter: {0}")]
    MalformedFrontmatter(String),

    #[error("missing required section `{0}`")]
    MissingRequiredSection(Section),

    #[error("required field `{0}` is empty")]
    IncompleteField(&'static str),
}

impl NoteError {
    /// Pipeline stage that raised the error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidFilename { .. } | Self::MalformedFrontmatter(_) => "frontmatter reader",
            Self::MissingRequiredSection(_) => "section extractor",
            Self::IncompleteField(_) => "card assembler",
        }
    }
}
