//! Terminal rendering of lookup results.
//!
//! Everything here returns strings so the REPL and single-topic mode print
//! identical output and tests can inspect it.

use obski_core::config::UiConfig;
use obski_core::{
    CitationCandidate, LookupError, LookupOutcome, RecordOutcome, SearchHit, format_score,
};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[90m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    show_markup: bool,
    highlight_threshold: u32,
}

impl Renderer {
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            color: ui.color,
            show_markup: ui.show_markup,
            highlight_threshold: ui.highlight_threshold,
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }

    pub fn outcome(&self, outcome: &LookupOutcome) -> String {
        let mut out = String::new();
        match outcome {
            LookupOutcome::Success {
                title,
                citations,
                score,
                ..
            } => {
                out.push_str(&self.paint(
                    BOLD,
                    &format!("Most obscure citations in \"{}\"", title),
                ));
                out.push_str("\n\n");
                for (i, candidate) in citations.iter().enumerate() {
                    out.push_str(&self.citation_card(i + 1, candidate));
                    out.push('\n');
                }
                out.push_str(&self.score_line(outcome.topic(), score));
            }
            LookupOutcome::FallbackSuccess {
                topic,
                reason,
                suggestions,
                score,
            } => {
                out.push_str(&self.paint(YELLOW, &reason.message(topic)));
                out.push_str("\n\n");
                out.push_str(&self.suggestions(suggestions));
                out.push('\n');
                out.push_str(&self.score_line(topic, score));
            }
        }
        out.push('\n');
        out
    }

    pub fn citation_card(&self, position: usize, candidate: &CitationCandidate) -> String {
        let obscure = candidate.final_score > self.highlight_threshold;
        let mut header = format!(
            "#{:<2} score {} (rarity {} + bonus {})",
            position, candidate.final_score, candidate.obscurity_score, candidate.similarity_bonus
        );
        if obscure {
            header.push_str("  OBSCURE");
        }
        let header = if obscure {
            self.paint(MAGENTA, &header)
        } else {
            self.paint(CYAN, &header)
        };

        let mut card = format!("{}\n    {}\n", header, candidate.cleaned_text);
        if self.show_markup {
            card.push_str(&format!(
                "    {}\n",
                self.paint(DIM, &format!("markup: {}", candidate.source_markup.trim()))
            ));
        }
        card
    }

    pub fn suggestions(&self, hits: &[SearchHit]) -> String {
        let mut out = String::new();
        for hit in hits {
            out.push_str(&format!("  * {}", self.paint(BOLD, &hit.title)));
            if !hit.description.is_empty() {
                out.push_str(&format!(" - {}", hit.description));
            }
            out.push('\n');
            if !hit.link.is_empty() {
                out.push_str(&format!("    {}\n", self.paint(DIM, &hit.link)));
            }
        }
        out
    }

    pub fn score_line(&self, topic: &str, score: &RecordOutcome) -> String {
        match score {
            RecordOutcome::Recorded { added, cumulative } => self.paint(
                GREEN,
                &format!(
                    "+{} Obscure Points! Total: {}",
                    format_score(*added),
                    format_score(*cumulative)
                ),
            ),
            RecordOutcome::AlreadyScored { cumulative } => format!(
                "You already scored \"{}\". Total: {}",
                topic,
                format_score(*cumulative)
            ),
            RecordOutcome::ZeroScore { cumulative } => {
                format!("No points this time. Total: {}", format_score(*cumulative))
            }
        }
    }

    pub fn total(&self, cumulative: u64) -> String {
        format!(
            "Obscure Points: {}",
            self.paint(BOLD, &format_score(cumulative))
        )
    }

    pub fn topics(&self, topics: &[String]) -> String {
        if topics.is_empty() {
            return "No topics scored yet.".to_string();
        }
        let mut out = format!("{} scored topic(s):\n", topics.len());
        for topic in topics {
            out.push_str(&format!("  * {}\n", topic));
        }
        out
    }

    pub fn error(&self, err: &LookupError) -> String {
        if err.is_not_found() || matches!(err, LookupError::EmptyTopic) {
            self.paint(YELLOW, &err.to_string())
        } else {
            self.paint(RED, &format!("Error: {}", err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obski_core::FallbackReason;
    use pretty_assertions::assert_eq;

    fn plain() -> Renderer {
        Renderer::new(&UiConfig {
            color: false,
            ..UiConfig::default()
        })
    }

    fn candidate(obscurity: u32, bonus: u32) -> CitationCandidate {
        CitationCandidate {
            raw_text: "[1] Wheeler, J.A. (1955). Geons.".into(),
            cleaned_text: "Wheeler, J.A. (1955). Geons.".into(),
            obscurity_score: obscurity,
            similarity_bonus: bonus,
            final_score: obscurity + bonus,
            source_markup: "<span>Wheeler</span>".into(),
        }
    }

    #[test]
    fn test_card_shows_breakdown() {
        let card = plain().citation_card(1, &candidate(57, 1));
        assert_eq!(
            card,
            "#1  score 58 (rarity 57 + bonus 1)\n    Wheeler, J.A. (1955). Geons.\n"
        );
    }

    #[test]
    fn test_card_highlights_above_threshold_only() {
        let r = plain();
        assert!(r.citation_card(1, &candidate(60, 11)).contains("OBSCURE"));
        assert!(!r.citation_card(1, &candidate(60, 10)).contains("OBSCURE"));
    }

    #[test]
    fn test_card_markup_toggle() {
        let r = Renderer::new(&UiConfig {
            color: false,
            show_markup: true,
            ..UiConfig::default()
        });
        assert!(r
            .citation_card(2, &candidate(20, 1))
            .contains("markup: <span>Wheeler</span>"));
        assert!(!plain().citation_card(2, &candidate(20, 1)).contains("markup"));
    }

    #[test]
    fn test_color_wraps_in_ansi() {
        let r = Renderer::new(&UiConfig::default());
        assert!(r.total(5).contains("\x1b[1m5\x1b[0m"));
        assert_eq!(plain().total(1234567), "Obscure Points: 12,34,567");
    }

    #[test]
    fn test_score_lines() {
        let r = plain();
        assert_eq!(
            r.score_line(
                "Quantum Foam",
                &RecordOutcome::Recorded {
                    added: 58,
                    cumulative: 1058
                }
            ),
            "+58 Obscure Points! Total: 1,058"
        );
        assert_eq!(
            r.score_line("Quantum Foam", &RecordOutcome::AlreadyScored { cumulative: 58 }),
            "You already scored \"Quantum Foam\". Total: 58"
        );
        assert_eq!(
            r.score_line("x", &RecordOutcome::ZeroScore { cumulative: 0 }),
            "No points this time. Total: 0"
        );
    }

    #[test]
    fn test_suggestions_with_description_and_link() {
        let hits = vec![
            SearchHit {
                title: "Geon (physics)".into(),
                description: "Hypothetical wave packet".into(),
                link: "https://en.wikipedia.org/wiki/Geon_(physics)".into(),
            },
            SearchHit {
                title: "Geon".into(),
                description: String::new(),
                link: String::new(),
            },
        ];
        assert_eq!(
            plain().suggestions(&hits),
            "  * Geon (physics) - Hypothetical wave packet\n    https://en.wikipedia.org/wiki/Geon_(physics)\n  * Geon\n"
        );
    }

    #[test]
    fn test_fallback_outcome_mentions_reason_and_suggestions() {
        let outcome = LookupOutcome::FallbackSuccess {
            topic: "Geons".into(),
            reason: FallbackReason::NoArticle,
            suggestions: vec![SearchHit {
                title: "Geon".into(),
                description: String::new(),
                link: String::new(),
            }],
            score: RecordOutcome::Recorded {
                added: 1,
                cumulative: 1,
            },
        };
        let text = plain().outcome(&outcome);
        assert!(text.contains("couldn't find a direct article for Geons"));
        assert!(text.contains("  * Geon\n"));
        assert!(text.contains("+1 Obscure Points! Total: 1"));
    }

    #[test]
    fn test_success_outcome_lists_cards_in_order() {
        let outcome = LookupOutcome::Success {
            topic: "Quantum Foam".into(),
            title: "Quantum foam".into(),
            citations: vec![candidate(57, 1), candidate(20, 1)],
            score: RecordOutcome::Recorded {
                added: 79,
                cumulative: 79,
            },
        };
        let text = plain().outcome(&outcome);
        assert!(text.starts_with("Most obscure citations in \"Quantum foam\""));
        let first = text.find("#1 ").unwrap();
        let second = text.find("#2 ").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_topics_listing() {
        assert_eq!(plain().topics(&[]), "No topics scored yet.");
        assert_eq!(
            plain().topics(&["quantum foam".into()]),
            "1 scored topic(s):\n  * quantum foam\n"
        );
    }

    #[test]
    fn test_error_messages() {
        let r = plain();
        assert_eq!(
            r.error(&LookupError::EmptyTopic),
            "Please enter a topic to explore."
        );
        let network = LookupError::Network(obski_core::ApiError::Status { status: 503 });
        assert_eq!(
            r.error(&network),
            "Error: An unexpected network error occurred: HTTP error! Status: 503"
        );
    }
}
