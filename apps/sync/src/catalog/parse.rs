//! Split a problem statement's HTML into description, examples and constraints.

use leetcard_core::{CatalogData, Example};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static EXAMPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<strong[^>]*>\s*Example\s*\d+\s*:?\s*</strong>\s*(?:</p>)?").unwrap()
});
static CONSTRAINTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<strong[^>]*>\s*Constraints\s*:?\s*</strong>\s*(?:</p>)?").unwrap()
});
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<li>(.*?)</li>").unwrap());
static SUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<sup>(.*?)</sup>").unwrap());
static BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</div>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#\d+|[a-zA-Z]+);").unwrap());
static TRAILING_SPACER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(?:\s|<p>\s*(?:&nbsp;|\u{a0})?\s*</p>|<p>)*$").unwrap());

/// Parse the `content` HTML of a problem.
pub fn parse_content(html: &str) -> CatalogData {
    let constraints_at = CONSTRAINTS_RE.find(html);
    let examples_end = constraints_at.map_or(html.len(), |m| m.start());

    let markers: Vec<_> = EXAMPLE_RE.find_iter(&html[..examples_end]).collect();

    let description_end = markers
        .first()
        .map(|m| m.start())
        .or_else(|| constraints_at.map(|m| m.start()))
        .unwrap_or(html.len());
    let description = strip_trailing_spacers(&html[..description_end]);

    let examples = markers
        .iter()
        .enumerate()
        .filter_map(|(i, marker)| {
            let end = markers.get(i + 1).map_or(examples_end, |next| next.start());
            parse_example(&html[marker.end()..end])
        })
        .collect();

    let constraints = constraints_at
        .map(|m| {
            let rest = &html[m.end()..];
            let list_end = rest.find("</ul>").unwrap_or(rest.len());
            LIST_ITEM_RE
                .captures_iter(&rest[..list_end])
                .map(|caps| caps[1].trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default();

    CatalogData {
        description,
        examples,
        constraints,
    }
}

fn strip_trailing_spacers(html: &str) -> String {
    TRAILING_SPACER_RE.replace(html, "").trim().to_string()
}

/// One example chunk, from just after its `Example N:` marker.
fn parse_example(chunk: &str) -> Option<Example> {
    let text = html_to_text(chunk);

    let input_at = text.find("Input:")?;
    let output_at = text.find("Output:")?;
    if output_at < input_at {
        return None;
    }
    let explanation_at = text[output_at..].find("Explanation:").map(|i| output_at + i);

    let input = &text[input_at + "Input:".len()..output_at];
    let output = &text[output_at + "Output:".len()..explanation_at.unwrap_or(text.len())];
    let explanation = explanation_at
        .map(|at| collapse_whitespace(&text[at + "Explanation:".len()..]))
        .filter(|e| !e.is_empty());

    Some(Example {
        input: collapse_whitespace(input),
        output: collapse_whitespace(output),
        explanation,
    })
}

fn html_to_text(html: &str) -> String {
    let powers = SUP_RE.replace_all(html, "^$1");
    let breaks = BREAK_RE.replace_all(&powers, "\n");
    let stripped = TAG_RE.replace_all(&breaks, "");
    decode_entities(&stripped)
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix('#')
                    .and_then(|n| n.parse::<u32>().ok())
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
