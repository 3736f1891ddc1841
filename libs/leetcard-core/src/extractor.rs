//! Section extractor for note bodies.
//!
//! # Format
//! ```markdown
//! 🔗 [LeetCode](https://leetcode.com/problems/trapping-rain-water/)
//!
//! ## Key Insight
//! > [!tip]- What's the trick?
//! > Water above a bar is bounded by the lower of the two maxima.
//!
//! ## Derivation
//! Optional, usually math.
//!
//! ## Algorithm
//! 1. Two pointers from both ends.
//!    - Move the side with the lower max.
//!
//! ## Complexity
//! Time: $O(n)$, Space: $O(1)$
//! ```
//!
//! The body is scanned once, line by line. Each line is classified and then
//! handed to the current state; a line that closes one region and opens the
//! next is re-dispatched to the new state instead of being captured twice.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{NoteError, Result};
use crate::types::{ExtractedFields, Section};

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[LeetCode\]\((https?://[^)\s]+)\)").unwrap());
static CALLOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^>\s*\[!tip\][-+]?").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

const KEY_INSIGHT: &str = "Key Insight";
const DERIVATION: &str = "Derivation";
const ALGORITHM: &str = "Algorithm";
const COMPLEXITY: &str = "Complexity";

/// Extract the five note regions from a body.
pub fn extract(body: &str) -> Result<ExtractedFields> {
    let mut scanner = Scanner::new();

    for line in body.lines() {
        scanner.process_line(line)?;
    }

    scanner.finalize()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekingLink,
    SeekingKeyInsight { heading_seen: bool },
    InCallout,
    SeekingDerivationOrAlgorithm,
    InDerivation,
    SeekingAlgorithm,
    InAlgorithm,
    SeekingComplexity,
    InComplexity,
    Done,
}

impl State {
    fn is_seeking(self) -> bool {
        matches!(
            self,
            Self::SeekingLink
                | Self::SeekingKeyInsight { .. }
                | Self::SeekingDerivationOrAlgorithm
                | Self::SeekingAlgorithm
                | Self::SeekingComplexity
        )
    }
}

/// Whether the current line still needs handling by the next state.
enum Step {
    Consumed,
    Redispatch,
}

struct Scanner {
    state: State,
    in_fence: bool,
    buffer: Vec<String>,
    problem_url: Option<String>,
    key_insight: Option<String>,
    derivation: Option<String>,
    algorithm: Option<String>,
    complexity: Option<String>,
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: State::SeekingLink,
            in_fence: false,
            buffer: Vec::new(),
            problem_url: None,
            key_insight: None,
            derivation: None,
            algorithm: None,
            complexity: None,
        }
    }

    fn process_line(&mut self, line: &str) -> Result<()> {
        let kind = LineType::parse(line);
        while let Step::Redispatch = self.step(line, &kind)? {}
        Ok(())
    }

    fn step(&mut self, line: &str, kind: &LineType<'_>) -> Result<Step> {
        if self.state.is_seeking() {
            if let LineType::Fence = kind {
                self.in_fence = !self.in_fence;
                return Ok(Step::Consumed);
            }
            if self.in_fence {
                return Ok(Step::Consumed);
            }
        }

        match self.state {
            State::SeekingLink => match kind {
                LineType::Link(url) => {
                    self.problem_url = Some(url.to_string());
                    self.state = State::SeekingKeyInsight {
                        heading_seen: false,
                    };
                }
                LineType::Quote(text) => {
                    if let Some(url) = LINK_RE.captures(text).and_then(|caps| caps.get(1)) {
                        self.problem_url = Some(url.as_str().to_string());
                        self.state = State::SeekingKeyInsight {
                            heading_seen: false,
                        };
                    }
                }
                LineType::Heading(KEY_INSIGHT) => {
                    return Err(NoteError::MissingRequiredSection(Section::Link));
                }
                _ => {}
            },

            State::SeekingKeyInsight {
                heading_seen: false,
            } => {
                if let LineType::Heading(KEY_INSIGHT) = kind {
                    self.state = State::SeekingKeyInsight { heading_seen: true };
                }
            }

            State::SeekingKeyInsight { heading_seen: true } => match kind {
                LineType::Callout => self.state = State::InCallout,
                LineType::Heading(_) => {
                    return Err(NoteError::MissingRequiredSection(Section::KeyInsight));
                }
                _ => {}
            },

            State::InCallout => match kind {
                LineType::Quote(text) => self.buffer.push(text.to_string()),
                LineType::BlankQuote => {
                    self.key_insight = Some(self.take_buffer());
                    self.state = State::SeekingDerivationOrAlgorithm;
                }
                // Any other line, a second callout included, ends the insight.
                _ => {
                    self.key_insight = Some(self.take_buffer());
                    self.state = State::SeekingDerivationOrAlgorithm;
                    return Ok(Step::Redispatch);
                }
            },

            State::SeekingDerivationOrAlgorithm => match kind {
                LineType::Heading(DERIVATION) => self.state = State::InDerivation,
                LineType::Heading(ALGORITHM) => self.state = State::InAlgorithm,
                LineType::Heading(COMPLEXITY) => {
                    return Err(NoteError::MissingRequiredSection(Section::Algorithm));
                }
                _ => {}
            },

            State::InDerivation => match kind {
                LineType::Heading(_) if !self.in_fence => {
                    self.finish_derivation();
                    self.state = State::SeekingAlgorithm;
                    return Ok(Step::Redispatch);
                }
                LineType::Fence => {
                    self.in_fence = !self.in_fence;
                    self.buffer.push(line.to_string());
                }
                _ => self.buffer.push(line.to_string()),
            },

            State::SeekingAlgorithm => match kind {
                LineType::Heading(ALGORITHM) => self.state = State::InAlgorithm,
                LineType::Heading(COMPLEXITY) => {
                    return Err(NoteError::MissingRequiredSection(Section::Algorithm));
                }
                _ => {}
            },

            State::InAlgorithm => match kind {
                LineType::Heading(_) | LineType::Fence => {
                    self.algorithm = Some(self.take_buffer());
                    self.state = State::SeekingComplexity;
                    return Ok(Step::Redispatch);
                }
                _ => self.buffer.push(line.to_string()),
            },

            State::SeekingComplexity => {
                if let LineType::Heading(COMPLEXITY) = kind {
                    self.state = State::InComplexity;
                }
            }

            State::InComplexity => match kind {
                LineType::Heading(_) | LineType::Fence => {
                    self.complexity = Some(self.take_buffer());
                    self.state = State::Done;
                }
                _ => self.buffer.push(line.to_string()),
            },

            State::Done => {}
        }

        Ok(Step::Consumed)
    }

    fn take_buffer(&mut self) -> String {
        let lines = std::mem::take(&mut self.buffer);
        trim_blank_lines(&lines)
    }

    fn finish_derivation(&mut self) {
        let raw = self.buffer.join("\n");
        self.buffer.clear();

        let without_comments = COMMENT_RE.replace_all(&raw, "");
        let lines: Vec<String> = without_comments.lines().map(str::to_string).collect();
        let text = trim_blank_lines(&lines);

        self.derivation = if text.trim().is_empty() { None } else { Some(text) };
    }

    fn finalize(mut self) -> Result<ExtractedFields> {
        match self.state {
            State::InCallout => self.key_insight = Some(self.take_buffer()),
            State::InDerivation => self.finish_derivation(),
            State::InAlgorithm => self.algorithm = Some(self.take_buffer()),
            State::InComplexity => self.complexity = Some(self.take_buffer()),
            _ => {}
        }

        let problem_url = self
            .problem_url
            .ok_or(NoteError::MissingRequiredSection(Section::Link))?;
        let key_insight = self
            .key_insight
            .ok_or(NoteError::MissingRequiredSection(Section::KeyInsight))?;
        let algorithm = self
            .algorithm
            .ok_or(NoteError::MissingRequiredSection(Section::Algorithm))?;
        let complexity = self
            .complexity
            .ok_or(NoteError::MissingRequiredSection(Section::Complexity))?;

        Ok(ExtractedFields {
            problem_url,
            key_insight,
            derivation: self.derivation,
            algorithm,
            complexity,
        })
    }
}

/// Drop leading and trailing blank lines, keep the rest as written.
fn trim_blank_lines(lines: &[String]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

enum LineType<'a> {
    Fence,
    Heading(&'a str),
    Callout,
    BlankQuote,
    Quote(&'a str),
    Blank,
    Link(&'a str),
    Text,
}

impl<'a> LineType<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            LineType::Fence
        } else if let Some(rest) = trimmed.strip_prefix("## ") {
            LineType::Heading(rest.trim())
        } else if trimmed == "##" {
            LineType::Heading("")
        } else if CALLOUT_RE.is_match(trimmed) {
            LineType::Callout
        } else if trimmed == ">" {
            LineType::BlankQuote
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            LineType::Quote(rest.strip_prefix(' ').unwrap_or(rest))
        } else if trimmed.is_empty() {
            LineType::Blank
        } else if let Some(caps) = LINK_RE.captures(trimmed) {
            match caps.get(1) {
                Some(url) => LineType::Link(url.as_str()),
                None => LineType::Text,
            }
        } else {
            LineType::Text
        }
    }
}
