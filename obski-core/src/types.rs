//! Core data types shared across the scoring pipeline, the lookup
//! orchestrator, and the API clients.

use serde::{Deserialize, Serialize};

/// A footnote citation that survived the substance filter and was scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationCandidate {
    /// Full text content of the list item, leading marker included.
    pub raw_text: String,
    /// Text with the leading `[n]` marker stripped and whitespace trimmed.
    pub cleaned_text: String,
    pub obscurity_score: u32,
    /// Always within `1..=20`.
    pub similarity_bonus: u32,
    /// `obscurity_score + similarity_bonus`.
    pub final_score: u32,
    /// Inner markup of the list item, links and all.
    pub source_markup: String,
}

/// One result from the search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
}

/// What the content API returned for a canonical title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleContent {
    /// Rendered article markup.
    Markup(String),
    /// The API answered, but with an error signal or without any content.
    Unavailable { reason: String },
}

/// Normalize a topic for ledger membership: trimmed and lowercased.
pub fn normalize_topic(topic: &str) -> String {
    topic.trim().to_lowercase()
}
