//! Test fixtures: note text and catalog responses.

use serde_json::{json, Value};

pub const DECK: &str = "LeetCode";
pub const MODEL: &str = "LeetCode Problem";

pub const TRAPPING_RAIN_WATER_URL: &str = "https://leetcode.com/problems/trapping-rain-water/";

/// Builder for a note file's contents.
#[derive(Debug, Clone)]
pub struct NoteText {
    tags: Vec<String>,
    url: String,
    key_insight: String,
    derivation: Option<String>,
    algorithm: Option<String>,
    complexity: String,
}

impl NoteText {
    /// The "42. Trapping Rain Water" note with no derivation.
    pub fn trapping_rain_water() -> Self {
        Self {
            tags: vec![
                "algorithm/two-pointer".to_string(),
                "data-structure/array".to_string(),
                "status/solved".to_string(),
            ],
            url: TRAPPING_RAIN_WATER_URL.to_string(),
            key_insight: "Water trapped at each bar is bounded by the lower of the tallest bars to its left and right.".to_string(),
            derivation: None,
            algorithm: Some(
                "1. Put `l` at the start and `r` at the end.\n2. Move the side with the lower max inward.\n3. Add `max - height` at each step."
                    .to_string(),
            ),
            complexity: "Time: O(n), Space: O(1)".to_string(),
        }
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn key_insight(mut self, text: &str) -> Self {
        self.key_insight = text.to_string();
        self
    }

    pub fn derivation(mut self, text: &str) -> Self {
        self.derivation = Some(text.to_string());
        self
    }

    pub fn without_algorithm(mut self) -> Self {
        self.algorithm = None;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::from("---\ntags:\n");
        for tag in &self.tags {
            out.push_str(&format!("  - {}\n", tag));
        }
        out.push_str("---\n");
        out.push_str(&format!("🔗 [LeetCode]({})\n\n", self.url));

        out.push_str("## Key Insight\n> [!tip]- Why does it work?\n");
        for line in self.key_insight.lines() {
            out.push_str(&format!("> {}\n", line));
        }
        out.push('\n');

        if let Some(derivation) = &self.derivation {
            out.push_str(&format!("## Derivation\n{}\n\n", derivation));
        }
        if let Some(algorithm) = &self.algorithm {
            out.push_str(&format!("## Algorithm\n{}\n\n", algorithm));
        }

        out.push_str(&format!("## Complexity\n{}\n\n", self.complexity));
        out.push_str("## Code\n```python\ndef trap(height): ...\n```\n");
        out
    }
}

pub const TRAPPING_RAIN_WATER_HTML: &str = r#"<p>Given <code>n</code> non-negative integers representing an elevation map where the width of each bar is <code>1</code>, compute how much water it can trap after raining.</p>

<p>&nbsp;</p>
<p><strong class="example">Example 1:</strong></p>
<pre>
<strong>Input:</strong> height = [0,1,0,2,1,0,1,3,2,1,2,1]
<strong>Output:</strong> 6
<strong>Explanation:</strong> 6 units of rain water are being trapped.
</pre>

<p><strong class="example">Example 2:</strong></p>
<pre>
<strong>Input:</strong> height = [4,2,0,3,2,5]
<strong>Output:</strong> 9
</pre>

<p>&nbsp;</p>
<p><strong>Constraints:</strong></p>
<ul>
	<li><code>n == height.length</code></li>
	<li><code>1 &lt;= n &lt;= 2 * 10<sup>4</sup></code></li>
</ul>
"#;

/// GraphQL response body for a found question.
pub fn question_body(content: &str) -> Value {
    json!({
        "data": {
            "question": {
                "questionId": "42",
                "title": "Trapping Rain Water",
                "titleSlug": "trapping-rain-water",
                "content": content
            }
        }
    })
}

/// GraphQL response body for an unknown slug.
pub fn missing_question_body() -> Value {
    json!({ "data": { "question": null } })
}
