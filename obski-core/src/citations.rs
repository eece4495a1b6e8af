//! Citation extraction and ranking.
//!
//! Pulls the reference list out of rendered article markup, drops entries too
//! short to be interesting, scores the rest, and keeps the best ten.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::scoring::{obscurity_score, similarity_bonus};
use crate::types::CitationCandidate;

/// Maximum number of ranked citations returned.
pub const MAX_RANKED: usize = 10;

/// Cleaned citations of this many characters or fewer are discarded.
pub const MIN_CITATION_CHARS: usize = 50;

static REFERENCES_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".reflist, .references").expect("valid references selector"));

static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("valid list item selector"));

static LEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[.*?\]\s*").expect("valid marker pattern"));

/// Strip a leading bracketed marker such as `[12]` and trim whitespace.
pub fn clean_citation_text(raw: &str) -> String {
    LEADING_MARKER.replace(raw, "").trim().to_string()
}

/// Extract, score, and rank the citations in `markup` against `topic`.
///
/// Returns at most [`MAX_RANKED`] candidates ordered by final score, highest
/// first; equal scores keep document order. Markup without a reference list
/// yields an empty vector, which callers treat as "no citations found".
pub fn rank(markup: &str, topic: &str) -> Vec<CitationCandidate> {
    let document = Html::parse_document(markup);

    let Some(references) = document.select(&REFERENCES_SELECTOR).next() else {
        debug!("no reference list in article markup");
        return Vec::new();
    };

    let mut candidates: Vec<CitationCandidate> = references
        .select(&ITEM_SELECTOR)
        .filter_map(|item| score_item(item, topic))
        .collect();

    // `sort_by` is stable, so ties stay in document order.
    candidates.sort_by(|a, b| b.final_score.cmp(&a.final_score));
    candidates.truncate(MAX_RANKED);

    debug!(count = candidates.len(), "ranked citations");
    candidates
}

fn score_item(item: ElementRef<'_>, topic: &str) -> Option<CitationCandidate> {
    let raw_text: String = item.text().collect();
    let cleaned_text = clean_citation_text(&raw_text);

    if cleaned_text.chars().count() <= MIN_CITATION_CHARS {
        return None;
    }

    let obscurity = obscurity_score(&cleaned_text);
    let bonus = similarity_bonus(topic, &cleaned_text);

    Some(CitationCandidate {
        raw_text,
        cleaned_text,
        obscurity_score: obscurity,
        similarity_bonus: bonus,
        final_score: obscurity + bonus,
        source_markup: item.inner_html(),
    })
}
