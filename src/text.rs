//! Word-level text helpers shared by the draft parser and the rule checks.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

pub(crate) static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.+)$").expect("valid list regex"));

// A number standing on its own. "2D" and "x10" are labels.
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:[.,]\d+)?\b").expect("valid number regex"));

const STOPWORDS: &[&str] = &[
    "about", "also", "been", "could", "each", "every", "feel", "feels", "from", "game", "games",
    "have", "into", "just", "less", "make", "makes", "many", "more", "most", "much", "only",
    "over", "player", "players", "should", "some", "such", "than", "that", "their", "them",
    "then", "there", "these", "they", "this", "those", "under", "very", "what", "when", "where",
    "which", "while", "will", "with", "would", "your",
];

/// Lowercase word tokens. Hyphens and apostrophes inside a word are kept.
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
        .map(|w| w.trim_matches(|c| c == '-' || c == '\'').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Crude suffix stripping so `telegraphed` and `telegraph` compare equal.
pub fn stem(word: &str) -> String {
    for suffix in ["ing", "ed", "es", "s", "ly"] {
        if let Some(base) = word.strip_suffix(suffix)
            && base.chars().count() >= 4
        {
            return base.to_string();
        }
    }
    word.to_string()
}

/// Distinctive stems of a text: words of four or more letters, minus stopwords.
pub fn keywords(text: &str) -> BTreeSet<String> {
    words(text)
        .into_iter()
        .flat_map(|w| {
            // Compounds like "wall-jump" also count by their parts.
            let mut parts: Vec<String> = w.split('-').map(str::to_string).collect();
            if parts.len() > 1 {
                parts.push(w.replace('-', ""));
            }
            parts
        })
        .filter(|w| w.chars().count() >= 4 && !STOPWORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

/// Whether `stem` occurs among `haystack` stems, allowing a shared prefix of five letters.
pub fn mentions(haystack: &BTreeSet<String>, stem: &str) -> bool {
    haystack.iter().any(|h| {
        h == stem
            || (stem.chars().count() >= 5 && h.starts_with(stem))
            || (h.chars().count() >= 5 && stem.starts_with(h.as_str()))
    })
}

/// Whether the text carries a numeric claim.
pub fn has_number(text: &str) -> bool {
    NUMBER.is_match(text)
}

/// Case-insensitive phrase match on word boundaries.
pub fn has_phrase(text: &str, phrase: &str) -> bool {
    let haystack = text.to_lowercase();
    let needle = phrase.to_lowercase();
    if needle.is_empty() {
        return false;
    }
    let is_word = |c: char| c.is_alphanumeric();
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(&needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let before_ok = !needle.starts_with(is_word)
            || haystack[..begin].chars().next_back().is_none_or(|c| !is_word(c));
        let after_ok = !needle.ends_with(is_word)
            || haystack[end..].chars().next().is_none_or(|c| !is_word(c));
        if before_ok && after_ok {
            return true;
        }
        start = begin + needle.chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Phrases from `phrases` found in `text`, in list order.
pub fn matched_phrases<'a>(text: &str, phrases: &[&'a str]) -> Vec<&'a str> {
    phrases
        .iter()
        .copied()
        .filter(|p| has_phrase(text, p))
        .collect()
}

pub fn has_any_phrase(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| has_phrase(text, p))
}

/// List items of a section, or its non-empty lines when it has no list.
///
/// Lines that continue a list item (indented, or not separated by a blank
/// line) are joined onto it.
pub fn entries(text: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    let mut after_blank = false;
    for line in text.lines() {
        if let Some(caps) = LIST_ITEM.captures(line) {
            items.push(caps[1].trim().to_string());
            after_blank = false;
        } else if line.trim().is_empty() {
            after_blank = true;
        } else if let Some(last) = items.last_mut()
            && (!after_blank || line.starts_with(char::is_whitespace))
        {
            last.push(' ');
            last.push_str(line.trim());
        }
    }
    if !items.is_empty() {
        return items;
    }
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Shortens `text` to `max` characters for quoting inside a finding.
pub fn excerpt(text: &str, max: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max {
        single_line
    } else {
        let cut: String = single_line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut.trim_end())
    }
}
