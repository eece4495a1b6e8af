//! Error types for the Obski core.
//!
//! Uses `thiserror` for public API error types with structured error variants
//! covering the encyclopedia APIs, the key-value store, the score ledger,
//! configuration, and the lookup orchestrator.

use std::path::PathBuf;

/// Errors from the search and content APIs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {message}")]
    Request { message: String },

    #[error("HTTP error! Status: {status}")]
    Status { status: u16 },

    #[error("could not decode response: {message}")]
    Decode { message: String },
}

/// Errors from the durable key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read store at {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to write store at {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Errors from the score ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode scored topics: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Every way a topic lookup can end without results.
///
/// Each variant carries what the user needs to see; [`LookupError::is_not_found`]
/// separates the "nothing to show" outcomes from genuine failures.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Please enter a topic to explore.")]
    EmptyTopic,

    #[error("Could not find any related Wikipedia articles for \"{topic}\".")]
    NoArticleFound { topic: String },

    #[error("The article \"{title}\" could not be processed.")]
    ArticleUnprocessable { title: String },

    #[error("Article \"{title}\" was found but contained no scorable citations. No suggestions found either.")]
    NoQualifyingCitations { title: String },

    #[error("An unexpected network error occurred: {0}")]
    Network(#[from] ApiError),

    #[error("Could not update the score ledger: {0}")]
    Ledger(#[from] LedgerError),
}

impl LookupError {
    /// True for the outcomes where the lookup itself worked but found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LookupError::NoArticleFound { .. }
                | LookupError::ArticleUnprocessable { .. }
                | LookupError::NoQualifyingCitations { .. }
        )
    }
}
