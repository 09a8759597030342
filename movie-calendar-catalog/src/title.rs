//! Title normalization for schedule entries.
//!
//! Schedule anchors carry titles in whatever shape the source editors typed
//! them:
//! ```text
//! Tyler Perry's Madea: Homecoming [Netflix]
//! ```
//!
//! This module derives the three things the rest of the pipeline needs from
//! such a string: a clean display title, a stable identity key, and the
//! ordered list of alternative strings to try against the metadata provider.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static TRAILING_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[.*?\]\s*$").expect("static pattern"));

static TRAILING_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[:\-]\s*.*$").expect("static pattern"));

static POSSESSIVE_ENTITY_OR_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\b[\p{L}\p{M}\p{N}\.]+(?:\s+[\p{L}\p{M}\p{N}\.]+)*['’]s?\s+)|(&#\d+;)|(\s*[:\-]\s*.*$)",
    )
    .expect("static pattern")
});

/// Derived forms of one raw schedule title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    /// Text exactly as scraped (trimmed).
    pub raw: String,
    /// Display title without trailing `[...]` annotations.
    pub clean: String,
    /// Normalized identity fragment of the clean title.
    pub identity: String,
}

/// Parse a raw schedule title into its derived forms.
///
/// # Examples
///
/// ```
/// use movie_calendar_catalog::title::parse_title;
///
/// let parsed = parse_title("Amélie [Re-issue]");
/// assert_eq!(parsed.clean, "Amélie");
/// assert_eq!(parsed.identity, "amelie");
/// ```
pub fn parse_title(raw: &str) -> ParsedTitle {
    let raw = raw.trim().to_string();
    let clean = clean_title(&raw);
    let identity = identity_key(&clean);
    ParsedTitle {
        raw,
        clean,
        identity,
    }
}

/// Remove a trailing bracketed annotation such as `[Limited]`.
pub fn clean_title(raw: &str) -> String {
    TRAILING_ANNOTATION.replace(raw.trim(), "").trim().to_string()
}

/// Canonical identity fragment for a title.
///
/// Decomposes to NFD, drops combining marks, keeps ASCII letters, digits and
/// underscores, then lower-cases. Pure and total.
pub fn identity_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Persistence key for a release: `{identity}_{YYYY-MM-DD}`.
pub fn record_id(clean_title: &str, release_date: NaiveDate) -> String {
    format!(
        "{}_{}",
        identity_key(clean_title),
        release_date.format("%Y-%m-%d")
    )
}

/// Ordered, de-duplicated search strings for a clean title.
///
/// 1. the clean title itself
/// 2. the title cut at the first colon or dash
/// 3. the title with leading possessives, numeric entities and trailing
///    clauses removed
pub fn search_candidates(clean: &str) -> Vec<String> {
    let clean = clean.trim();
    let mut candidates: Vec<String> = Vec::with_capacity(3);
    if clean.is_empty() {
        return candidates;
    }
    candidates.push(clean.to_string());

    let base = TRAILING_CLAUSE.replace(clean, "").trim().to_string();
    push_distinct(&mut candidates, base);

    let stripped = POSSESSIVE_ENTITY_OR_CLAUSE
        .replace_all(clean, "")
        .trim()
        .to_string();
    push_distinct(&mut candidates, stripped);

    candidates
}

fn push_distinct(candidates: &mut Vec<String>, candidate: String) {
    if !candidate.is_empty() && !candidates.contains(&candidate) {
        candidates.push(candidate);
    }
}
