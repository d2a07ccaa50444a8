//! Tag list extraction from requests such as `add tag "holiday_sale" and vip`.

use std::sync::LazyLock;

use regex::Regex;

const STOP_WORDS: [&str; 20] = [
    "to", "these", "those", "orders", "order", "please", "the", "my", "a", "an", "and", "with",
    "for", "add", "apply", "update", "change", "set", "tag", "tags",
];

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("static pattern"));

static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btags?\b:?").expect("static pattern"));

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,|\s]+").expect("static pattern"));

static TAG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static pattern"));

/// `true` when `text` contains the word `tag` or `tags`.
///
/// Callers use this together with an empty [`parse_tag_list`] result to ask
/// for clarification.
#[must_use]
pub fn mentions_tag_keyword(text: &str) -> bool {
    KEYWORD.is_match(text)
}

/// Only the quoted phrases of `text`, trimmed and deduplicated.
#[must_use]
pub fn quoted_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in QUOTED.captures_iter(text) {
        let quoted = caps[1].trim();
        if !quoted.is_empty() && !tags.iter().any(|t| t == quoted) {
            tags.push(quoted.to_string());
        }
    }
    tags
}

/// Extract tags from `text`, in order of first appearance and without
/// duplicates.
///
/// Quoted phrases are taken verbatim. Bare words are read after the first
/// `tag`/`tags` keyword; filler words and tokens with characters outside
/// `[A-Za-z0-9_-]` are dropped.
#[must_use]
pub fn parse_tag_list(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    };

    for quoted in quoted_tags(text) {
        push(&quoted);
    }

    if let Some(keyword) = KEYWORD.find(text) {
        let rest = &text[keyword.end()..];
        for raw in SEPARATORS.split(rest) {
            let token = raw.trim_end_matches(['?', '!', '.']);
            if token.is_empty() || is_stop_word(token) || !TAG_TOKEN.is_match(token) {
                continue;
            }
            push(token);
        }
    }

    tags
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.iter().any(|w| w.eq_ignore_ascii_case(token))
}
