//! Core data models for the movie query service
//!
//! This module contains the data types shared across the derived views:
//! the raw movie record fetched from the upstream metadata provider, the
//! lightweight search hit, and the `MovieSource` trait that lets the
//! orchestrator run against the real OMDb client or a test stub.

pub mod catalog;
pub mod omdb;

pub use catalog::{curated_genre_ids, DEFAULT_BOX_OFFICE_IDS};
pub use omdb::{OmdbClient, SourceError};

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

/// A single movie record as fetched from the upstream provider.
///
/// Immutable once constructed; every orchestrator call that misses the
/// cache produces a fresh instance. The `ratings` map holds the raw,
/// provider-scaled score strings exactly as reported upstream (for
/// example `"8.8/10"` or `"87%"`); normalization to a common scale is the
/// rating aggregator's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Movie title, case preserved (comparisons are case-insensitive)
    pub title: String,
    /// Release year, when the upstream reports one
    pub year: Option<i32>,
    /// Genre names for this movie
    pub genres: Vec<String>,
    /// Primary language(s), when reported
    pub language: Option<String>,
    /// Raw per-provider rating strings, keyed by provider name
    pub ratings: BTreeMap<String, String>,
    /// Lifetime box-office gross in whole dollars, when reported
    pub box_office: Option<u64>,
    /// Provider-assigned identifier (IMDb id), when available
    pub imdb_id: Option<String>,
}

impl MovieRecord {
    /// Returns true if the record lists the given genre (case-insensitive).
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres
            .iter()
            .any(|g| g.eq_ignore_ascii_case(genre.trim()))
    }

    /// Returns true if this record shares at least one genre with `other`.
    pub fn shares_genre_with(&self, other: &MovieRecord) -> bool {
        self.genres.iter().any(|g| other.has_genre(g))
    }
}

/// A single hit from an upstream title search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Movie title as reported by the search endpoint
    pub title: String,
    /// Release year string as reported (e.g. "2019" or "2008–2013")
    pub year: Option<String>,
    /// IMDb identifier, when present
    pub imdb_id: Option<String>,
}

impl SearchHit {
    /// The identifier to use for a follow-up detail fetch: the IMDb id
    /// when present, otherwise the title.
    pub fn identifier(&self) -> &str {
        self.imdb_id.as_deref().unwrap_or(&self.title)
    }
}

/// Upstream movie metadata source.
///
/// The orchestrator is generic over this trait so tests can substitute a
/// deterministic stub for the network-backed [`OmdbClient`]. Implementors
/// perform no caching of their own and make a single attempt per call;
/// retry policy belongs to the orchestrator.
pub trait MovieSource {
    /// Fetches a single movie record by title or IMDb id.
    fn fetch(
        &self,
        title_or_id: &str,
    ) -> impl Future<Output = Result<MovieRecord, SourceError>> + Send;

    /// Searches for movies matching a free-text term (one result page).
    fn search(
        &self,
        term: &str,
        page: u32,
    ) -> impl Future<Output = Result<Vec<SearchHit>, SourceError>> + Send;
}
