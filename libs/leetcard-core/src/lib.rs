//! Core library for turning problem notes into flashcard fields.
//!
//! Provides:
//! - Frontmatter and file name reader (problem identity, pattern tags)
//! - Section extractor for the note body
//! - Markdown to card HTML rendering
//! - Card assembler producing the store's field schema
//!
//! Nothing in here touches the network or the file system.

pub mod assembler;
pub mod error;
pub mod extractor;
pub mod frontmatter;
pub mod markdown;
pub mod types;

pub use assembler::{CardAssembler, ObsidianVault, RenderOptions};
pub use error::{NoteError, Result};
pub use extractor::extract;
pub use frontmatter::{read_header, NoteHeader, TagPolicy};
pub use markdown::{ListClasses, MathDelimiters};
pub use types::{
    field, CardFields, CatalogData, Example, ExtractedFields, NoteSource, PatternTags,
    ProblemIdentity, Section,
};
