//! Markdown to card HTML.
//!
//! Covers what notes actually use: paragraphs, headings, fenced code,
//! nested ordered/unordered lists and a few inline forms. Math spans are
//! shielded before any other processing so `*`, `_` and `<` inside them
//! reach the card unchanged.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static DISPLAY_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").unwrap());
static INLINE_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([^$\n]+?)\$").unwrap());
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}(\\d+)\u{E001}").unwrap());
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-*+]|\d+[.)])\s+(.*)$").unwrap());
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
static CODE_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap());
static STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").unwrap());
static EM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*?)\*|\b_([^_]+)_\b").unwrap());

/// How math spans are written into the card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathDelimiters {
    /// `$…$` and `$$…$$`, as written in the note.
    #[default]
    Verbatim,
    /// `\(…\)` and `\[…\]`.
    Mathjax,
}

/// CSS classes put on rendered lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListClasses {
    pub ordered: Option<&'static str>,
    pub unordered: Option<&'static str>,
}

impl ListClasses {
    pub const ALGORITHM: Self = Self {
        ordered: Some("algorithm-steps"),
        unordered: Some("algorithm-items"),
    };

    pub const DERIVATION: Self = Self {
        ordered: Some("derivation-steps"),
        unordered: Some("derivation-items"),
    };
}

/// Escape text for use in HTML content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render note markdown to HTML.
pub fn render(text: &str, math: MathDelimiters, classes: ListClasses) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut spans = Vec::new();
    let shielded = shield_math(text, &mut spans);

    let mut renderer = Renderer::new(classes);
    for line in shielded.lines() {
        renderer.process_line(line);
    }
    let html = renderer.finish();

    restore_math(&html, &spans, math)
}

struct MathSpan {
    body: String,
    display: bool,
}

/// Replace math with placeholders, leaving fenced code and code spans alone.
fn shield_math(text: &str, spans: &mut Vec<MathSpan>) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut prose: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim();
        let fence = trimmed.starts_with("```") || trimmed.starts_with("~~~");

        if fence && !in_fence && !prose.is_empty() {
            out.push(shield_prose(&prose.join("\n"), spans));
            prose.clear();
        }
        if fence {
            in_fence = !in_fence;
            out.push(line.to_string());
        } else if in_fence {
            out.push(line.to_string());
        } else {
            prose.push(line);
        }
    }
    if !prose.is_empty() {
        out.push(shield_prose(&prose.join("\n"), spans));
    }

    out.join("\n")
}

fn shield_prose(text: &str, spans: &mut Vec<MathSpan>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for code in CODE_SPAN_RE.find_iter(text) {
        out.push_str(&shield_spans(&text[last..code.start()], spans));
        out.push_str(code.as_str());
        last = code.end();
    }
    out.push_str(&shield_spans(&text[last..], spans));

    out
}

fn shield_spans(text: &str, spans: &mut Vec<MathSpan>) -> String {
    let mut shield = |caps: &Captures<'_>, display: bool| {
        spans.push(MathSpan {
            body: caps[1].to_string(),
            display,
        });
        format!("\u{E000}{}\u{E001}", spans.len() - 1)
    };

    let text = DISPLAY_MATH_RE.replace_all(text, |caps: &Captures<'_>| shield(caps, true));
    INLINE_MATH_RE
        .replace_all(&text, |caps: &Captures<'_>| shield(caps, false))
        .into_owned()
}

fn restore_math(html: &str, spans: &[MathSpan], math: MathDelimiters) -> String {
    PLACEHOLDER_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let Some(span) = caps[1].parse::<usize>().ok().and_then(|i| spans.get(i)) else {
                return String::new();
            };
            let body = escape_html(&span.body);
            match (math, span.display) {
                (MathDelimiters::Verbatim, true) => format!("$${}$$", body),
                (MathDelimiters::Verbatim, false) => format!("${}$", body),
                (MathDelimiters::Mathjax, true) => format!("\\[{}\\]", body),
                (MathDelimiters::Mathjax, false) => format!("\\({}\\)", body),
            }
        })
        .into_owned()
}

/// Inline markdown for one fragment of text.
fn render_inline(text: &str) -> String {
    let mut out = String::new();
    let mut last = 0;

    for caps in CODE_SPAN_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&render_emphasis(&text[last..whole.start()]));
        out.push_str("<code>");
        out.push_str(&escape_html(&caps[1]));
        out.push_str("</code>");
        last = whole.end();
    }
    out.push_str(&render_emphasis(&text[last..]));

    out
}

fn render_emphasis(text: &str) -> String {
    let escaped = escape_html(text);
    let linked = LINK_RE.replace_all(&escaped, "<a href=\"$2\">$1</a>");
    let strong = STRONG_RE.replace_all(&linked, |caps: &Captures<'_>| {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        format!("<strong>{}</strong>", inner)
    });
    EM_RE
        .replace_all(&strong, |caps: &Captures<'_>| {
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            format!("<em>{}</em>", inner)
        })
        .into_owned()
}

struct ListFrame {
    indent: usize,
    ordered: bool,
}

struct Renderer {
    classes: ListClasses,
    out: Vec<String>,
    paragraph: Vec<String>,
    lists: Vec<ListFrame>,
    code: Option<Vec<String>>,
    blank_since_item: bool,
}

impl Renderer {
    fn new(classes: ListClasses) -> Self {
        Self {
            classes,
            out: Vec::new(),
            paragraph: Vec::new(),
            lists: Vec::new(),
            code: None,
            blank_since_item: false,
        }
    }

    fn process_line(&mut self, line: &str) {
        let trimmed = line.trim();

        if let Some(code) = self.code.as_mut() {
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                let body = escape_html(&code.join("\n"));
                self.code = None;
                self.out.push(format!("<pre><code>{}</code></pre>", body));
            } else {
                code.push(line.to_string());
            }
            return;
        }

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            self.flush_paragraph();
            self.close_lists();
            self.code = Some(Vec::new());
            return;
        }

        if trimmed.is_empty() {
            self.flush_paragraph();
            self.blank_since_item = true;
            return;
        }

        if let Some(caps) = LIST_ITEM_RE.captures(line) {
            let indent = indent_width(&caps[1]);
            let marker = &caps[2];
            let ordered = marker.ends_with('.') || marker.ends_with(')');
            let start = marker
                .trim_end_matches(['.', ')'])
                .parse::<usize>()
                .unwrap_or(1);
            self.push_item(indent, ordered, start, &caps[3]);
            return;
        }

        if let Some(caps) = HEADING_RE.captures(trimmed) {
            self.flush_paragraph();
            self.close_lists();
            let level = caps[1].len();
            self.out
                .push(format!("<h{0}>{1}</h{0}>", level, render_inline(&caps[2])));
            return;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');
        if !self.lists.is_empty() && (indented || !self.blank_since_item) {
            self.out.push(render_inline(trimmed));
            return;
        }

        self.close_lists();
        self.paragraph.push(render_inline(trimmed));
    }

    fn push_item(&mut self, indent: usize, ordered: bool, start: usize, content: &str) {
        self.flush_paragraph();
        self.blank_since_item = false;

        loop {
            match self.lists.last() {
                None => {
                    self.open_list(indent, ordered, start);
                    break;
                }
                Some(top) if indent > top.indent => {
                    self.open_list(indent, ordered, start);
                    break;
                }
                Some(top) if indent == top.indent => {
                    if top.ordered == ordered {
                        self.out.push("</li>".to_string());
                    } else {
                        self.close_top_list();
                        self.open_list(indent, ordered, start);
                    }
                    break;
                }
                Some(_) => self.close_top_list(),
            }
        }

        self.out.push(format!("<li>{}", render_inline(content)));
    }

    fn open_list(&mut self, indent: usize, ordered: bool, start: usize) {
        let (tag, class) = if ordered {
            ("ol", self.classes.ordered)
        } else {
            ("ul", self.classes.unordered)
        };

        let mut open = format!("<{}", tag);
        if let Some(class) = class {
            open.push_str(&format!(" class=\"{}\"", class));
        }
        if ordered && start != 1 {
            open.push_str(&format!(" start=\"{}\"", start));
        }
        open.push('>');

        self.out.push(open);
        self.lists.push(ListFrame { indent, ordered });
    }

    fn close_top_list(&mut self) {
        if let Some(frame) = self.lists.pop() {
            let tag = if frame.ordered { "ol" } else { "ul" };
            self.out.push(format!("</li></{}>", tag));
        }
    }

    fn close_lists(&mut self) {
        while !self.lists.is_empty() {
            self.close_top_list();
        }
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let body = self.paragraph.join("<br>\n");
        self.paragraph.clear();
        self.out.push(format!("<p>{}</p>", body));
    }

    fn finish(mut self) -> String {
        if let Some(code) = self.code.take() {
            self.out
                .push(format!("<pre><code>{}</code></pre>", escape_html(&code.join("\n"))));
        }
        self.flush_paragraph();
        self.close_lists();
        self.out.join("\n")
    }
}

/// Leading whitespace width, tabs counted as four columns.
fn indent_width(prefix: &str) -> usize {
    prefix.chars().map(|c| if c == '\t' { 4 } else { 1 }).sum()
}
