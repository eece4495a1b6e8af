//! Topic lookup orchestration.
//!
//! A lookup is a small state machine: resolve the topic to a canonical title,
//! fetch the article, check the response, rank its citations, and fall back to
//! related-title suggestions whenever one of those steps comes up empty. The
//! pure transitions are free functions so the branching can be tested without
//! any network code; [`Explorer`] drives them against the search and content
//! APIs and then settles the score with the ledger.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::citations::rank;
use crate::error::{ApiError, LookupError};
use crate::ledger::{RecordOutcome, ScoreAward, ScoreLedger};
use crate::types::{ArticleContent, CitationCandidate, SearchHit};

/// Results requested when resolving a topic to its canonical title.
pub const RESOLVE_LIMIT: usize = 1;

/// Results requested when suggesting related titles.
pub const SUGGESTION_LIMIT: usize = 5;

/// Flat points for a lookup that ends in suggestions, however many are shown.
pub const FALLBACK_AWARD: u64 = 1;

/// Free-text title search.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Up to `limit` hits for `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ApiError>;
}

/// Rendered article retrieval.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// The rendered markup for a canonical `title`, or an unavailable signal.
    async fn fetch_article(&self, title: &str) -> Result<ArticleContent, ApiError>;
}

/// Progress notifications for whoever is presenting the lookup.
pub trait ExploreCallback: Send + Sync {
    /// Called when a lookup starts loading and again when it ends, on every path.
    fn on_status_change(&self, status: ExploreStatus);

    /// Called with the cumulative score whenever the displayed total should refresh.
    fn on_score_update(&self, _cumulative: u64) {}
}

/// Loading state of the current lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreStatus {
    Loading { topic: String },
    Idle,
}

/// Callback that ignores every notification.
pub struct NoOpCallback;

impl ExploreCallback for NoOpCallback {
    fn on_status_change(&self, _status: ExploreStatus) {}
}

/// Marks a lookup as loading and clears it when dropped.
struct LoadingGuard<'a> {
    callback: &'a dyn ExploreCallback,
}

impl<'a> LoadingGuard<'a> {
    fn start(callback: &'a dyn ExploreCallback, topic: &str) -> Self {
        callback.on_status_change(ExploreStatus::Loading {
            topic: topic.to_string(),
        });
        Self { callback }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.callback.on_status_change(ExploreStatus::Idle);
    }
}

/// Why a lookup fell back to suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The search returned no title for the topic.
    NoArticle,
    /// The content API reported an error or returned no content.
    ArticleUnprocessable { title: String },
    /// The article had no citation that passed the ranking filter.
    NoQualifyingCitations { title: String },
}

impl FallbackReason {
    /// Whether an article was resolved before falling back.
    pub fn article_found(&self) -> bool {
        !matches!(self, FallbackReason::NoArticle)
    }

    /// Explanation shown above the suggestions.
    pub fn message(&self, topic: &str) -> String {
        if self.article_found() {
            format!(
                "We found the article, but its citations did not meet the OBSKI rule \
                 (e.g: too short, too modern, or missing academic identifiers). \
                 You've earned {} Obscure Point!",
                FALLBACK_AWARD
            )
        } else {
            format!(
                "OBSKI couldn't find a direct article for {}. Here are related Wikipedia articles. \
                 You've earned {} Obscure Point!",
                topic, FALLBACK_AWARD
            )
        }
    }

    /// The terminal error when no suggestions are available either.
    pub fn into_not_found(self, topic: &str) -> LookupError {
        match self {
            FallbackReason::NoArticle => LookupError::NoArticleFound {
                topic: topic.to_string(),
            },
            FallbackReason::ArticleUnprocessable { title } => {
                LookupError::ArticleUnprocessable { title }
            }
            FallbackReason::NoQualifyingCitations { title } => {
                LookupError::NoQualifyingCitations { title }
            }
        }
    }
}

/// A non-terminal lookup state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStep {
    Resolve,
    Fetch { title: String },
    Parse { title: String, content: ArticleContent },
    Rank { title: String, markup: String },
    Fallback { reason: FallbackReason },
}

impl LookupStep {
    pub fn name(&self) -> &'static str {
        match self {
            LookupStep::Resolve => "resolve",
            LookupStep::Fetch { .. } => "fetch",
            LookupStep::Parse { .. } => "parse",
            LookupStep::Rank { .. } => "rank",
            LookupStep::Fallback { .. } => "fallback",
        }
    }
}

/// Where a lookup landed before any score is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ranked {
        title: String,
        citations: Vec<CitationCandidate>,
    },
    Suggested {
        reason: FallbackReason,
        suggestions: Vec<SearchHit>,
    },
}

/// Result of a rank step: either the lookup is resolved or it moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Next(LookupStep),
    Done(Resolution),
}

/// Resolve → Fetch when the search produced a title, else Fallback.
pub fn resolve_transition(topic: &str, hits: Vec<SearchHit>) -> LookupStep {
    match hits.into_iter().next() {
        Some(hit) => {
            if hit.title != topic {
                warn!(
                    topic = %topic,
                    title = %hit.title,
                    "Search topic updated to the official title"
                );
            }
            LookupStep::Fetch { title: hit.title }
        }
        None => LookupStep::Fallback {
            reason: FallbackReason::NoArticle,
        },
    }
}

/// Parse → Rank when the content API returned markup, else Fallback.
pub fn parse_transition(title: String, content: ArticleContent) -> LookupStep {
    match content {
        ArticleContent::Markup(markup) if !markup.trim().is_empty() => {
            LookupStep::Rank { title, markup }
        }
        ArticleContent::Markup(_) => {
            debug!(title = %title, "article markup is empty");
            LookupStep::Fallback {
                reason: FallbackReason::ArticleUnprocessable { title },
            }
        }
        ArticleContent::Unavailable { reason } => {
            debug!(title = %title, reason = %reason, "article unavailable");
            LookupStep::Fallback {
                reason: FallbackReason::ArticleUnprocessable { title },
            }
        }
    }
}

/// Rank → done when any citation qualifies, else Fallback.
///
/// The canonical title, not the user's spelling, is what the similarity bonus
/// is measured against.
pub fn rank_transition(title: String, markup: &str) -> Transition {
    let citations = rank(markup, &title);
    if citations.is_empty() {
        Transition::Next(LookupStep::Fallback {
            reason: FallbackReason::NoQualifyingCitations { title },
        })
    } else {
        Transition::Done(Resolution::Ranked { title, citations })
    }
}

/// Fallback → suggestions when the related search found anything.
///
/// A failed related search degrades to the most specific "not found" error
/// rather than surfacing as a network failure.
pub fn fallback_transition(
    topic: &str,
    reason: FallbackReason,
    related: Result<Vec<SearchHit>, ApiError>,
) -> Result<Resolution, LookupError> {
    match related {
        Ok(suggestions) if !suggestions.is_empty() => Ok(Resolution::Suggested {
            reason,
            suggestions,
        }),
        Ok(_) => Err(reason.into_not_found(topic)),
        Err(e) => {
            warn!(topic = %topic, error = %e, "Related-title search failed");
            Err(reason.into_not_found(topic))
        }
    }
}

/// A lookup that produced something to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Ranked citations from the resolved article.
    Success {
        topic: String,
        title: String,
        citations: Vec<CitationCandidate>,
        score: RecordOutcome,
    },
    /// Related titles, shown when the article path came up empty.
    FallbackSuccess {
        topic: String,
        reason: FallbackReason,
        suggestions: Vec<SearchHit>,
        score: RecordOutcome,
    },
}

impl LookupOutcome {
    pub fn score(&self) -> &RecordOutcome {
        match self {
            LookupOutcome::Success { score, .. } | LookupOutcome::FallbackSuccess { score, .. } => {
                score
            }
        }
    }

    /// The topic as the user entered it (trimmed).
    pub fn topic(&self) -> &str {
        match self {
            LookupOutcome::Success { topic, .. } | LookupOutcome::FallbackSuccess { topic, .. } => {
                topic
            }
        }
    }
}

/// Record the score for a resolution under the user's topic.
///
/// The ledger key is always the topic as the user typed it (normalized by the
/// ledger), never the canonical title.
pub fn settle(
    ledger: &ScoreLedger,
    topic: &str,
    resolution: Resolution,
) -> Result<LookupOutcome, LookupError> {
    match resolution {
        Resolution::Ranked { title, citations } => {
            let score = ledger.record(ScoreAward::Citations(&citations), topic)?;
            Ok(LookupOutcome::Success {
                topic: topic.to_string(),
                title,
                citations,
                score,
            })
        }
        Resolution::Suggested {
            reason,
            suggestions,
        } => {
            let score = ledger.record(ScoreAward::Flat(FALLBACK_AWARD), topic)?;
            Ok(LookupOutcome::FallbackSuccess {
                topic: topic.to_string(),
                reason,
                suggestions,
                score,
            })
        }
    }
}

/// The single entry point for exploring a topic.
pub struct Explorer {
    search: Arc<dyn SearchApi>,
    content: Arc<dyn ContentApi>,
    ledger: ScoreLedger,
    callback: Arc<dyn ExploreCallback>,
}

impl Explorer {
    pub fn new(
        search: Arc<dyn SearchApi>,
        content: Arc<dyn ContentApi>,
        ledger: ScoreLedger,
        callback: Arc<dyn ExploreCallback>,
    ) -> Self {
        Self {
            search,
            content,
            ledger,
            callback,
        }
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// Look up `topic`, rank its article's citations, and record the score.
    ///
    /// An empty topic is rejected before any request is made. The callback
    /// sees `Loading` once the lookup starts and `Idle` on every exit path.
    pub async fn explore(&self, topic: &str) -> Result<LookupOutcome, LookupError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(LookupError::EmptyTopic);
        }

        let _loading = LoadingGuard::start(self.callback.as_ref(), topic);

        let resolution = self.drive(topic).await?;
        let outcome = settle(&self.ledger, topic, resolution)?;

        match outcome.score() {
            RecordOutcome::Recorded { cumulative, .. }
            | RecordOutcome::AlreadyScored { cumulative } => {
                self.callback.on_score_update(*cumulative);
            }
            RecordOutcome::ZeroScore { .. } => {}
        }

        info!(topic = %topic, added = outcome.score().added(), "lookup complete");
        Ok(outcome)
    }

    async fn drive(&self, topic: &str) -> Result<Resolution, LookupError> {
        let mut step = LookupStep::Resolve;
        loop {
            debug!(topic = %topic, step = step.name(), "lookup step");
            step = match step {
                LookupStep::Resolve => {
                    let hits = self.search.search(topic, RESOLVE_LIMIT).await?;
                    resolve_transition(topic, hits)
                }
                LookupStep::Fetch { title } => {
                    let content = self.content.fetch_article(&title).await?;
                    LookupStep::Parse { title, content }
                }
                LookupStep::Parse { title, content } => parse_transition(title, content),
                LookupStep::Rank { title, markup } => match rank_transition(title, &markup) {
                    Transition::Next(next) => next,
                    Transition::Done(resolution) => return Ok(resolution),
                },
                LookupStep::Fallback { reason } => {
                    let related = self.search.search(topic, SUGGESTION_LIMIT).await;
                    return fallback_transition(topic, reason, related);
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn hit(title: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            description: String::new(),
            link: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        }
    }

    const WHEELER_MARKUP: &str = r#"<div class="reflist"><ol class="references"><li>Wheeler, J.A. (1955). Geons. Physical Review, vol. 97, p.511. doi:10.1103/PhysRev.97.511</li></ol></div>"#;

    #[test]
    fn test_resolve_with_title_fetches_it() {
        let step = resolve_transition("quantum foam", vec![hit("Quantum foam")]);
        assert_eq!(
            step,
            LookupStep::Fetch {
                title: "Quantum foam".into()
            }
        );
    }

    #[test]
    fn test_resolve_without_title_falls_back() {
        let step = resolve_transition("Xyzzyplugh123", vec![]);
        assert_eq!(
            step,
            LookupStep::Fallback {
                reason: FallbackReason::NoArticle
            }
        );
    }

    #[test]
    fn test_parse_unavailable_falls_back() {
        let step = parse_transition(
            "Geon".into(),
            ArticleContent::Unavailable {
                reason: "missingtitle".into(),
            },
        );
        assert_eq!(
            step,
            LookupStep::Fallback {
                reason: FallbackReason::ArticleUnprocessable {
                    title: "Geon".into()
                }
            }
        );
    }

    #[test]
    fn test_parse_blank_markup_falls_back() {
        let step = parse_transition("Geon".into(), ArticleContent::Markup("  ".into()));
        assert_eq!(step.name(), "fallback");
    }

    #[test]
    fn test_parse_markup_ranks() {
        let step = parse_transition("Geon".into(), ArticleContent::Markup("<p>x</p>".into()));
        assert_eq!(step.name(), "rank");
    }

    #[test]
    fn test_rank_without_citations_falls_back() {
        let transition = rank_transition("Geon".into(), "<p>No references here.</p>");
        assert_eq!(
            transition,
            Transition::Next(LookupStep::Fallback {
                reason: FallbackReason::NoQualifyingCitations {
                    title: "Geon".into()
                }
            })
        );
    }

    #[test]
    fn test_rank_with_citations_is_done() {
        match rank_transition("Quantum foam".into(), WHEELER_MARKUP) {
            Transition::Done(Resolution::Ranked { title, citations }) => {
                assert_eq!(title, "Quantum foam");
                assert_eq!(citations.len(), 1);
                assert_eq!(citations[0].final_score, 58);
            }
            other => panic!("unexpected transition: {:?}", other),
        }
    }

    #[test]
    fn test_fallback_with_suggestions() {
        let resolution =
            fallback_transition("geon", FallbackReason::NoArticle, Ok(vec![hit("Geon (physics)")]))
                .unwrap();
        assert!(matches!(resolution, Resolution::Suggested { ref suggestions, .. } if suggestions.len() == 1));
    }

    #[test]
    fn test_fallback_empty_keeps_most_specific_reason() {
        let err = fallback_transition(
            "Xyzzyplugh123",
            FallbackReason::NoArticle,
            Ok(vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, LookupError::NoArticleFound { ref topic } if topic == "Xyzzyplugh123"));

        let err = fallback_transition(
            "geon",
            FallbackReason::NoQualifyingCitations {
                title: "Geon".into(),
            },
            Err(ApiError::Status { status: 502 }),
        )
        .unwrap_err();
        assert!(matches!(err, LookupError::NoQualifyingCitations { ref title } if title == "Geon"));
    }

    #[test]
    fn test_fallback_messages_differ() {
        let no_article = FallbackReason::NoArticle.message("Geon");
        assert!(no_article.contains("couldn't find a direct article for Geon"));
        let found = FallbackReason::NoQualifyingCitations {
            title: "Geon".into(),
        }
        .message("Geon");
        assert!(found.contains("We found the article"));
    }

    #[test]
    fn test_settle_keys_ledger_on_user_topic() {
        let ledger = ScoreLedger::new(Arc::new(MemoryStore::new()));
        let Transition::Done(resolution) = rank_transition("Quantum foam".into(), WHEELER_MARKUP)
        else {
            panic!("expected ranked resolution");
        };

        let outcome = settle(&ledger, "QF Topic", resolution).unwrap();
        assert_eq!(outcome.score().added(), 58);
        assert!(ledger.is_scored("qf topic").unwrap());
        assert!(!ledger.is_scored("quantum foam").unwrap());
    }

    #[test]
    fn test_settle_twice_scores_once() {
        let ledger = ScoreLedger::new(Arc::new(MemoryStore::new()));
        let suggested = || Resolution::Suggested {
            reason: FallbackReason::NoArticle,
            suggestions: vec![hit("Geon (physics)")],
        };

        let first = settle(&ledger, "geon", suggested()).unwrap();
        let second = settle(&ledger, "Geon ", suggested()).unwrap();
        assert_eq!(first.score().added(), FALLBACK_AWARD);
        assert_eq!(
            *second.score(),
            RecordOutcome::AlreadyScored {
                cumulative: FALLBACK_AWARD
            }
        );
    }
}
