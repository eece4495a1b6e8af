//! The score ledger: a cumulative score plus the set of topics already scored.
//!
//! Each normalized topic earns points at most once. A search that totals zero
//! points leaves the ledger untouched so the topic can still score later.
//! Only [`ScoreLedger::reset`] ever lowers the total.

use std::sync::Arc;

use tracing::{error, info};

use crate::error::LedgerError;
use crate::store::KeyValueStore;
use crate::types::{CitationCandidate, normalize_topic};

/// Store key for the cumulative score (decimal integer).
pub const TOTAL_SCORE_KEY: &str = "total_score";

/// Store key for the scored topics (JSON array of normalized topics).
pub const SCORED_TOPICS_KEY: &str = "scored_topics";

/// Points to add for one lookup.
#[derive(Debug, Clone, Copy)]
pub enum ScoreAward<'a> {
    /// A fixed number of points, used by the fallback paths.
    Flat(u64),
    /// The sum of the ranked citations' final scores.
    Citations(&'a [CitationCandidate]),
}

impl ScoreAward<'_> {
    pub fn total(&self) -> u64 {
        match self {
            ScoreAward::Flat(points) => *points,
            ScoreAward::Citations(candidates) => candidates
                .iter()
                .map(|c| u64::from(c.final_score))
                .sum(),
        }
    }
}

/// What [`ScoreLedger::record`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Points were added.
    Recorded { added: u64, cumulative: u64 },
    /// The topic had already been scored; nothing changed.
    AlreadyScored { cumulative: u64 },
    /// The award was zero; nothing changed and the topic stays eligible.
    ZeroScore { cumulative: u64 },
}

impl RecordOutcome {
    /// The cumulative score after this call.
    pub fn cumulative(&self) -> u64 {
        match self {
            RecordOutcome::Recorded { cumulative, .. }
            | RecordOutcome::AlreadyScored { cumulative }
            | RecordOutcome::ZeroScore { cumulative } => *cumulative,
        }
    }

    /// Points added by this call.
    pub fn added(&self) -> u64 {
        match self {
            RecordOutcome::Recorded { added, .. } => *added,
            _ => 0,
        }
    }
}

/// Cumulative score bookkeeping over an injectable key-value store.
#[derive(Clone)]
pub struct ScoreLedger {
    store: Arc<dyn KeyValueStore>,
}

impl ScoreLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The cumulative score.
    ///
    /// Only the leading decimal digits count, so `"58abc"` reads as 58.
    /// Absent values and values without leading digits read as zero.
    pub fn cumulative_score(&self) -> Result<u64, LedgerError> {
        let raw = self.store.get(TOTAL_SCORE_KEY)?;
        Ok(raw.map(|v| parse_leading_digits(&v)).unwrap_or(0))
    }

    /// Normalized topics that have already earned points, in scoring order.
    ///
    /// A corrupt topic list is logged and treated as empty.
    pub fn scored_topics(&self) -> Result<Vec<String>, LedgerError> {
        let Some(raw) = self.store.get(SCORED_TOPICS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(topics) => Ok(topics),
            Err(e) => {
                error!(error = %e, "Error parsing scored topics from the ledger");
                Ok(Vec::new())
            }
        }
    }

    /// Whether `topic` (after normalization) has already been scored.
    pub fn is_scored(&self, topic: &str) -> Result<bool, LedgerError> {
        let normalized = normalize_topic(topic);
        Ok(self.scored_topics()?.contains(&normalized))
    }

    /// Add `award` to the cumulative score for `topic`, once per normalized topic.
    pub fn record(&self, award: ScoreAward<'_>, topic: &str) -> Result<RecordOutcome, LedgerError> {
        let normalized = normalize_topic(topic);
        let mut topics = self.scored_topics()?;

        if topics.contains(&normalized) {
            info!(topic = %topic, "Topic already scored. Skipping score update.");
            return Ok(RecordOutcome::AlreadyScored {
                cumulative: self.cumulative_score()?,
            });
        }

        let added = award.total();
        if added == 0 {
            info!(topic = %topic, "Topic yielded zero score. Skipping storage update.");
            return Ok(RecordOutcome::ZeroScore {
                cumulative: self.cumulative_score()?,
            });
        }

        let cumulative = self.cumulative_score()?.saturating_add(added);
        let previous_topics = self.store.get(SCORED_TOPICS_KEY)?;

        // Topic first, then total. A failed total write restores the old topic list.
        topics.push(normalized);
        self.store
            .set(SCORED_TOPICS_KEY, &serde_json::to_string(&topics)?)?;

        if let Err(e) = self.store.set(TOTAL_SCORE_KEY, &cumulative.to_string()) {
            let restored = match &previous_topics {
                Some(raw) => self.store.set(SCORED_TOPICS_KEY, raw),
                None => self.store.remove(SCORED_TOPICS_KEY),
            };
            if let Err(restore_err) = restored {
                error!(topic = %topic, error = %restore_err, "Could not roll back scored topics");
            }
            return Err(e.into());
        }

        info!(topic = %topic, added, cumulative, "New topic scored");
        Ok(RecordOutcome::Recorded { added, cumulative })
    }

    /// Clear the cumulative score and the scored topics.
    pub fn reset(&self) -> Result<(), LedgerError> {
        self.store.remove(TOTAL_SCORE_KEY)?;
        self.store.remove(SCORED_TOPICS_KEY)?;
        info!("Score ledger reset");
        Ok(())
    }
}

/// Digits at the start of `raw` (after leading whitespace), saturating at `u64::MAX`.
fn parse_leading_digits(raw: &str) -> u64 {
    raw.trim_start()
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    fn ledger() -> (ScoreLedger, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ScoreLedger::new(store.clone()), store)
    }

    fn candidate(final_score: u32) -> CitationCandidate {
        CitationCandidate {
            raw_text: String::new(),
            cleaned_text: String::new(),
            obscurity_score: final_score.saturating_sub(1),
            similarity_bonus: 1,
            final_score,
            source_markup: String::new(),
        }
    }

    #[test]
    fn test_empty_ledger_reads_zero() {
        let (ledger, _) = ledger();
        assert_eq!(ledger.cumulative_score().unwrap(), 0);
        assert!(ledger.scored_topics().unwrap().is_empty());
    }

    #[test]
    fn test_record_citations_sums_final_scores() {
        let (ledger, store) = ledger();
        let candidates = vec![candidate(58), candidate(30)];
        let outcome = ledger
            .record(ScoreAward::Citations(&candidates), "Quantum Foam")
            .unwrap();
        assert_eq!(
            outcome,
            RecordOutcome::Recorded {
                added: 88,
                cumulative: 88
            }
        );
        assert_eq!(store.get(TOTAL_SCORE_KEY).unwrap().as_deref(), Some("88"));
        assert_eq!(
            store.get(SCORED_TOPICS_KEY).unwrap().as_deref(),
            Some(r#"["quantum foam"]"#)
        );
    }

    #[test]
    fn test_record_is_once_per_normalized_topic() {
        let (ledger, _) = ledger();
        ledger.record(ScoreAward::Flat(1), "Quantum Foam").unwrap();
        let again = ledger
            .record(ScoreAward::Flat(500), "  quantum FOAM ")
            .unwrap();
        assert_eq!(again, RecordOutcome::AlreadyScored { cumulative: 1 });
        assert_eq!(ledger.cumulative_score().unwrap(), 1);
        assert_eq!(ledger.scored_topics().unwrap(), vec!["quantum foam"]);
    }

    #[test]
    fn test_zero_award_leaves_topic_eligible() {
        let (ledger, store) = ledger();
        let outcome = ledger.record(ScoreAward::Citations(&[]), "Geons").unwrap();
        assert_eq!(outcome, RecordOutcome::ZeroScore { cumulative: 0 });
        assert_eq!(store.get(TOTAL_SCORE_KEY).unwrap(), None);
        assert_eq!(store.get(SCORED_TOPICS_KEY).unwrap(), None);

        let later = ledger.record(ScoreAward::Flat(1), "Geons").unwrap();
        assert_eq!(later.added(), 1);
    }

    #[test]
    fn test_reset_clears_both_and_allows_rescoring() {
        let (ledger, _) = ledger();
        ledger.record(ScoreAward::Flat(10), "Geons").unwrap();
        ledger.reset().unwrap();
        assert_eq!(ledger.cumulative_score().unwrap(), 0);
        assert!(!ledger.is_scored("geons").unwrap());

        let outcome = ledger.record(ScoreAward::Flat(10), "Geons").unwrap();
        assert_eq!(
            outcome,
            RecordOutcome::Recorded {
                added: 10,
                cumulative: 10
            }
        );
    }

    #[test]
    fn test_corrupt_values_read_as_empty() {
        let (ledger, store) = ledger();
        store.set(TOTAL_SCORE_KEY, "not a number").unwrap();
        store.set(SCORED_TOPICS_KEY, "{broken").unwrap();
        assert_eq!(ledger.cumulative_score().unwrap(), 0);
        assert!(ledger.scored_topics().unwrap().is_empty());

        let outcome = ledger.record(ScoreAward::Flat(3), "Geons").unwrap();
        assert_eq!(outcome.cumulative(), 3);
    }

    #[test]
    fn test_cumulative_accumulates_across_topics() {
        let (ledger, _) = ledger();
        ledger.record(ScoreAward::Flat(1), "a topic").unwrap();
        ledger.record(ScoreAward::Flat(41), "another topic").unwrap();
        assert_eq!(ledger.cumulative_score().unwrap(), 42);
        assert_eq!(
            ledger.scored_topics().unwrap(),
            vec!["a topic", "another topic"]
        );
    }

    #[test]
    fn test_score_reads_leading_digits_only() {
        let (ledger, store) = ledger();
        for (raw, expected) in [("58abc", 58), ("  12 ", 12), ("007", 7), ("abc58", 0), ("", 0), ("-5", 0)] {
            store.set(TOTAL_SCORE_KEY, raw).unwrap();
            assert_eq!(ledger.cumulative_score().unwrap(), expected, "raw {:?}", raw);
        }
    }

    /// Store whose writes to one key fail a set number of times.
    struct FailingStore {
        inner: MemoryStore,
        failing_key: &'static str,
        failures_left: std::sync::Mutex<u32>,
    }

    impl FailingStore {
        fn new(failing_key: &'static str, failures: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                failing_key,
                failures_left: std::sync::Mutex::new(failures),
            }
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.failing_key {
                let mut left = self.failures_left.lock().unwrap();
                if *left > 0 {
                    *left -= 1;
                    return Err(StoreError::Write {
                        path: "ledger.json".into(),
                        message: "disk full".into(),
                    });
                }
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_topic_write_adds_no_points_and_retry_scores_once() {
        let store = Arc::new(FailingStore::new(SCORED_TOPICS_KEY, 1));
        let ledger = ScoreLedger::new(store.clone());

        assert!(ledger.record(ScoreAward::Flat(58), "Quantum Foam").is_err());
        assert_eq!(ledger.cumulative_score().unwrap(), 0);
        assert!(!ledger.is_scored("quantum foam").unwrap());

        let retry = ledger.record(ScoreAward::Flat(58), "Quantum Foam").unwrap();
        assert_eq!(
            retry,
            RecordOutcome::Recorded {
                added: 58,
                cumulative: 58
            }
        );
        assert_eq!(ledger.cumulative_score().unwrap(), 58);
    }

    #[test]
    fn test_failed_total_write_rolls_back_topic() {
        let store = Arc::new(FailingStore::new(TOTAL_SCORE_KEY, 1));
        let ledger = ScoreLedger::new(store.clone());
        ledger.record(ScoreAward::Flat(5), "Geons").ok();
        assert_eq!(ledger.cumulative_score().unwrap(), 0);
        assert!(ledger.scored_topics().unwrap().is_empty());
        assert_eq!(store.get(SCORED_TOPICS_KEY).unwrap(), None);

        // Earlier topics survive a rollback.
        let store = Arc::new(FailingStore::new(TOTAL_SCORE_KEY, 0));
        let ledger = ScoreLedger::new(store.clone());
        ledger.record(ScoreAward::Flat(5), "Geons").unwrap();
        *store.failures_left.lock().unwrap() = 1;
        assert!(ledger.record(ScoreAward::Flat(7), "Kugelblitz").is_err());
        assert_eq!(ledger.scored_topics().unwrap(), vec!["geons"]);
        assert_eq!(ledger.cumulative_score().unwrap(), 5);

        let retry = ledger.record(ScoreAward::Flat(7), "Kugelblitz").unwrap();
        assert_eq!(retry.cumulative(), 12);
    }
}
