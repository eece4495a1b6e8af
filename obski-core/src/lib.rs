//! # Obski Core
//!
//! Core library for Obski, the citation obscurity explorer.
//! Provides the citation scoring heuristics, reference-list extraction and
//! ranking, the lookup state machine, the score ledger and its storage,
//! configuration, and the shared types and errors.

pub mod citations;
pub mod config;
pub mod error;
pub mod format;
pub mod ledger;
pub mod lookup;
pub mod scoring;
pub mod store;
pub mod types;

// Re-export commonly used types at the crate root.
pub use citations::rank;
pub use config::{ObskiConfig, load_config};
pub use error::{ApiError, ConfigError, LedgerError, LookupError, StoreError};
pub use format::format_score;
pub use ledger::{RecordOutcome, ScoreAward, ScoreLedger};
pub use lookup::{
    ContentApi, ExploreCallback, ExploreStatus, Explorer, FallbackReason, LookupOutcome,
    NoOpCallback, SearchApi,
};
pub use scoring::{obscurity_score, similarity_bonus};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::{ArticleContent, CitationCandidate, SearchHit, normalize_topic};
