//! Lightweight markup for web-search answers.
//!
//! Not a markdown parser. Four rewrite rules run in a fixed order over
//! HTML-escaped text:
//!
//! 1. `**text**` becomes `<strong>text</strong>`
//! 2. a line starting with `* ` becomes `<li>…</li>`
//! 3. each run of consecutive list items is wrapped in one `<ul>`
//! 4. backslash-newline and bare newlines become `<br>`
//!
//! Nested or malformed markup is left as whatever these rules produce.

use regex::Regex;
use std::sync::OnceLock;

fn bold_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"))
}

fn bullet_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\* (.*)$").expect("bullet pattern is valid"))
}

fn list_run_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:<li>[^\n]*?</li>\s*)+").expect("list run pattern is valid")
    })
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `text` as markup safe to insert into the page.
pub fn render(text: &str) -> String {
    let escaped = escape_html(text);
    let bolded = bold_pattern().replace_all(&escaped, "<strong>${1}</strong>");
    let listed = bullet_pattern().replace_all(&bolded, "<li>${1}</li>");
    let wrapped = list_run_pattern().replace_all(&listed, "<ul>${0}</ul>");
    wrapped.replace("\\\n", "<br>").replace('\n', "<br>")
}
