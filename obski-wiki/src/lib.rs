//! # Obski Wiki
//!
//! HTTP clients for the MediaWiki action API.
//! [`WikipediaClient`] answers both halves of a lookup: `opensearch` for
//! title search and `parse` for rendered article markup.

pub mod client;
pub mod response;

pub use client::WikipediaClient;
