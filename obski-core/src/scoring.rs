//! Citation text heuristics: the obscurity score and the topic similarity bonus.
//!
//! Both functions are pure and deterministic. The obscurity score rewards
//! length, scholarly vocabulary, old publication years, and catalogue
//! identifiers; the similarity bonus rewards citations that mention the topic.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Points per character-length unit, capped.
const LENGTH_DIVISOR: usize = 5;
const LENGTH_CAP: u32 = 50;

/// Substrings (matched case-insensitively) that mark scholarly or archival sources.
pub const NICHE_KEYWORDS: &[&str] = &[
    "monograph",
    "dissertation",
    "proceedings",
    "archival",
    "ephemera",
    "quarterly",
    "vol.",
    "ibid",
    "op. cit.",
    "journal of",
    "university press",
    "hdl:",
    "doi:",
];
const NICHE_KEYWORD_POINTS: u32 = 15;

const YEAR_POINTS: u32 = 10;

/// Catalogue identifier abbreviations (matched case-sensitively).
pub const IDENTIFIER_MARKERS: &[&str] = &["ASIN", "JSTOR", "OCLC", "ISBN", "SSRN"];
const IDENTIFIER_POINTS: u32 = 5;

/// Topic words too common to count towards similarity.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "in", "on", "of", "for", "is", "to", "was", "with",
];

pub const MIN_SIMILARITY_BONUS: u32 = 1;
pub const MAX_SIMILARITY_BONUS: u32 = 20;

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:18|19)[0-9]{2}\b").expect("valid year pattern"));

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("valid word pattern"));

/// Score how obscure a citation looks.
///
/// `min(len / 5, 50)`, plus 15 for every niche keyword present, plus 10 for
/// every year between 1800 and 1999, plus 5 once if any identifier marker
/// appears. There is no upper bound.
pub fn obscurity_score(text: &str) -> u32 {
    let length = text.chars().count();
    let mut score = ((length / LENGTH_DIVISOR) as u32).min(LENGTH_CAP);

    let lowered = text.to_lowercase();
    let keyword_hits = NICHE_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .count() as u32;
    score += keyword_hits * NICHE_KEYWORD_POINTS;

    let years = YEAR_PATTERN.find_iter(text).count() as u32;
    score += years * YEAR_POINTS;

    if IDENTIFIER_MARKERS.iter().any(|marker| text.contains(marker)) {
        score += IDENTIFIER_POINTS;
    }

    score
}

/// Lowercased word tokens of `text`, in order, duplicates kept.
fn word_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Topic tokens that carry meaning: longer than two characters and not a stop word.
pub fn significant_topic_tokens(topic: &str) -> Vec<String> {
    word_tokens(topic)
        .into_iter()
        .filter(|token| token.chars().count() > 2 && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// Bonus for how much of the topic the citation mentions, in `1..=20`.
///
/// `floor(1 + 19 * matched / significant)`, where a significant topic token is
/// matched when it appears as a whole word anywhere in the citation. A topic
/// with no significant tokens earns the minimum.
pub fn similarity_bonus(topic: &str, text: &str) -> u32 {
    let significant = significant_topic_tokens(topic);
    if significant.is_empty() {
        return MIN_SIMILARITY_BONUS;
    }

    let citation_words: HashSet<String> = word_tokens(text).into_iter().collect();
    let matched = significant
        .iter()
        .filter(|token| citation_words.contains(*token))
        .count() as u32;

    let span = MAX_SIMILARITY_BONUS - MIN_SIMILARITY_BONUS;
    MIN_SIMILARITY_BONUS + (span * matched) / significant.len() as u32
}
