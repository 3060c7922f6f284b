//! Minimal editorial markup to HTML
//!
//! A fixed, ordered list of text substitutions, not a parser: `**bold**`,
//! then `*italic*`, then `[text](http(s)://url)`, then line breaks. Markers
//! do not nest and unmatched markers pass through untouched. Re-running the
//! conversion on its own output is not guaranteed to be a no-op when literal
//! asterisks survive the first pass.

use regex::Regex;
use std::sync::LazyLock;

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.+?)\]\((https?://[^\s)]+)\)").unwrap());

pub fn to_html(text: &str) -> String {
    let html = BOLD_RE.replace_all(text, "<strong>${1}</strong>");
    let html = ITALIC_RE.replace_all(&html, "<em>${1}</em>");
    let html = LINK_RE.replace_all(&html, "<a href='${2}' target='_blank'>${1}</a>");
    html.replace('\n', "<br/>")
}
