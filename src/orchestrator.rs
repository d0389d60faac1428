//! Query orchestration: cache-first read-through to the upstream source
//!
//! The orchestrator is the entry point every derived view goes through:
//! validate the query, check the cache, fall through to the source
//! client on a miss, hand the raw records to the derived component, and
//! write the result back. The cache store and source client are
//! constructor-injected service objects; nothing here reaches for
//! ambient globals.

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use crate::boxoffice::{self, BoxOfficeEntry};
use crate::cache::{CacheKey, CacheStore};
use crate::data::{curated_genre_ids, MovieRecord, MovieSource, SourceError, DEFAULT_BOX_OFFICE_IDS};
use crate::genre::{self, GenreFilters, GenrePage};
use crate::ratings::{self, RatingSummary};

/// Default freshness window for cached entries, in seconds
pub const DEFAULT_TTL_SECS: u64 = 600;

/// Maximum accepted query length
const MAX_QUERY_LEN: usize = 100;

/// Cap on search hits expanded into detail records for ranking
const RANKING_CANDIDATE_LIMIT: usize = 10;

/// Request-level error taxonomy
///
/// Cache trouble is deliberately not represented here: the store fails
/// open, so a cache problem is logged and the request proceeds.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The query itself is missing or malformed; reported before any
    /// cache or upstream access
    #[error("invalid query: {0}")]
    Validation(String),

    /// No matching movie upstream
    #[error("movie not found: {0}")]
    NotFound(String),

    /// The upstream did not answer in time (transient; retrying later
    /// may succeed)
    #[error("the movie service did not respond in time; try again shortly")]
    UpstreamTimeout,

    /// The upstream throttled us (transient; retrying later may succeed)
    #[error("the movie service is rate limiting requests; try again shortly")]
    UpstreamRateLimited,

    /// The upstream answered with something unusable
    #[error("the movie service returned an unusable response: {0}")]
    Upstream(String),
}

impl From<SourceError> for QueryError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::NotFound(message) => QueryError::NotFound(message),
            SourceError::RateLimited => QueryError::UpstreamRateLimited,
            SourceError::Timeout => QueryError::UpstreamTimeout,
            SourceError::Malformed(message) => QueryError::Upstream(message),
        }
    }
}

/// Cache-first query orchestrator over an injected movie source
#[derive(Debug, Clone)]
pub struct Orchestrator<S> {
    source: S,
    cache: CacheStore,
    ttl_secs: u64,
}

impl<S: MovieSource> Orchestrator<S> {
    /// Creates an orchestrator with the default freshness window
    pub fn new(source: S, cache: CacheStore) -> Self {
        Self {
            source,
            cache,
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    /// Overrides the cache freshness window (seconds)
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Removes the cache entry for the given key, forcing the next
    /// matching query to recompute
    pub fn invalidate(&self, key: &CacheKey) {
        self.cache.invalidate(key);
    }

    /// Looks up a single movie record by title or id
    pub async fn search(&self, query: &str) -> Result<MovieRecord, QueryError> {
        let query = validate_query(query)?;
        self.fetch_record(&query).await
    }

    /// Builds the normalized rating summary for one title
    pub async fn ratings_summary(&self, title: &str) -> Result<RatingSummary, QueryError> {
        let title = validate_query(title)?;
        let key = summary_key(&title);
        if let Some(summary) = self.cache.get::<RatingSummary>(&key) {
            return Ok(summary);
        }

        let record = self.fetch_record(&title).await?;
        let summary = ratings::summarize(&record);
        self.cache.set(&key, &summary, self.ttl_secs);
        Ok(summary)
    }

    /// Builds rating summaries for a batch of titles
    ///
    /// The output is positionally aligned with the input; each position
    /// independently holds a summary or the error for that title, so one
    /// title's failure never drops or reorders another's result.
    pub async fn ratings_summary_batch(
        &self,
        titles: &[String],
    ) -> Result<Vec<Result<RatingSummary, QueryError>>, QueryError> {
        if titles.is_empty() {
            return Err(QueryError::Validation(
                "provide at least one title to summarize".to_string(),
            ));
        }
        let lookups = titles.iter().map(|title| self.ratings_summary(title));
        Ok(join_all(lookups).await)
    }

    /// Returns the genre names for one title
    pub async fn genres(&self, title: &str) -> Result<Vec<String>, QueryError> {
        let title = validate_query(title)?;
        let key = genres_key(&title);
        if let Some(genres) = self.cache.get::<Vec<String>>(&key) {
            return Ok(genres);
        }

        let record = self.fetch_record(&title).await?;
        self.cache.set(&key, &record.genres, self.ttl_secs);
        Ok(record.genres)
    }

    /// Browses a genre with optional filters and pagination
    ///
    /// The candidate pool is the genre's curated id list; a genre
    /// without one yields an empty page rather than an error. Individual
    /// candidate fetch failures drop that candidate only.
    pub async fn browse_genre(
        &self,
        name: &str,
        filters: &GenreFilters,
        page: i64,
        page_size: usize,
    ) -> Result<GenrePage, QueryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::Validation("genre name is required".to_string()));
        }
        if page_size == 0 {
            return Err(QueryError::Validation(
                "page_size must be positive".to_string(),
            ));
        }
        if let Some(min_rating) = filters.min_rating {
            if !(0.0..=100.0).contains(&min_rating) {
                return Err(QueryError::Validation(
                    "rating must be between 0 and 100".to_string(),
                ));
            }
        }

        let key = genre_key(name, filters, page, page_size);
        if let Some(cached) = self.cache.get::<GenrePage>(&key) {
            return Ok(cached);
        }

        let ids = curated_genre_ids(name).unwrap_or(&[]);
        let records = self.fetch_available(ids.iter().copied()).await;
        let result = genre::browse(&records, name, filters, page, page_size);
        self.cache.set(&key, &result, self.ttl_secs);
        Ok(result)
    }

    /// Ranks movies by box-office gross, with recommendations
    ///
    /// With a query, the input set is the first page of upstream search
    /// hits (detail failures drop that hit only). Without one, the
    /// curated fallback list keeps the response deterministic and
    /// non-empty.
    pub async fn boxoffice_top(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<BoxOfficeEntry>, QueryError> {
        let query = match query.map(str::trim) {
            Some(q) if !q.is_empty() => Some(validate_query(q)?),
            _ => None,
        };

        let key = boxoffice_key(query.as_deref());
        if let Some(cached) = self.cache.get::<Vec<BoxOfficeEntry>>(&key) {
            return Ok(cached);
        }

        let records = match &query {
            Some(q) => {
                let hits = self.source.search(q, 1).await?;
                let idents: Vec<String> = hits
                    .iter()
                    .take(RANKING_CANDIDATE_LIMIT)
                    .map(|hit| hit.identifier().to_string())
                    .collect();
                self.fetch_available(idents.iter().map(String::as_str))
                    .await
            }
            None => {
                self.fetch_available(DEFAULT_BOX_OFFICE_IDS.iter().copied())
                    .await
            }
        };

        let ranked = boxoffice::rank(&records);
        self.cache.set(&key, &ranked, self.ttl_secs);
        Ok(ranked)
    }

    /// Cache-first fetch of one raw record, shared by every view
    async fn fetch_record(&self, title_or_id: &str) -> Result<MovieRecord, QueryError> {
        let key = record_key(title_or_id);
        if let Some(record) = self.cache.get::<MovieRecord>(&key) {
            return Ok(record);
        }

        let record = self.fetch_with_retry(title_or_id).await?;
        self.cache.set(&key, &record, self.ttl_secs);
        Ok(record)
    }

    /// Single bounded retry, on timeout only
    ///
    /// `NotFound` is definitive and is never retried; rate limiting
    /// would only be aggravated by an immediate second attempt.
    async fn fetch_with_retry(&self, title_or_id: &str) -> Result<MovieRecord, QueryError> {
        match self.source.fetch(title_or_id).await {
            Err(SourceError::Timeout) => {
                debug!(query = %title_or_id, "upstream timeout; retrying once");
                Ok(self.source.fetch(title_or_id).await?)
            }
            other => Ok(other?),
        }
    }

    /// Fetches a set of candidate records, dropping individual failures
    ///
    /// Used where partial results are acceptable: one slow or missing
    /// candidate must not abort the whole derived view.
    async fn fetch_available<'a>(
        &self,
        idents: impl Iterator<Item = &'a str>,
    ) -> Vec<MovieRecord> {
        let lookups: Vec<_> = idents
            .map(|ident| async move { (ident, self.fetch_record(ident).await) })
            .collect();
        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(ident, result)| match result {
                Ok(record) => Some(record),
                Err(error) => {
                    warn!(candidate = %ident, error = %error, "dropping unavailable candidate");
                    None
                }
            })
            .collect()
    }
}

/// Validates a free-text query: non-empty after trimming, bounded length
///
/// The length limit counts characters, not bytes, so accented titles are
/// not penalized for their encoding.
fn validate_query(query: &str) -> Result<String, QueryError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(QueryError::Validation("query is required".to_string()));
    }
    if query.chars().count() > MAX_QUERY_LEN {
        return Err(QueryError::Validation(format!(
            "query must be {MAX_QUERY_LEN} characters or fewer"
        )));
    }
    Ok(query.to_string())
}

/// Cache key for a raw movie record
pub fn record_key(title_or_id: &str) -> CacheKey {
    CacheKey::new("movie").param("q", title_or_id)
}

/// Cache key for a rating summary
pub fn summary_key(title: &str) -> CacheKey {
    CacheKey::new("ratings").param("title", title)
}

/// Cache key for a title's genre list
pub fn genres_key(title: &str) -> CacheKey {
    CacheKey::new("genres").param("title", title)
}

/// Cache key for one genre page
pub fn genre_key(name: &str, filters: &GenreFilters, page: i64, page_size: usize) -> CacheKey {
    CacheKey::new("genre")
        .param("name", name)
        .param("page", &page.to_string())
        .param("page_size", &page_size.to_string())
        .param(
            "rating",
            &filters
                .min_rating
                .map(|r| r.to_string())
                .unwrap_or_default(),
        )
        .param("language", filters.language.as_deref().unwrap_or(""))
}

/// Cache key for a box-office ranking
pub fn boxoffice_key(query: Option<&str>) -> CacheKey {
    CacheKey::new("boxoffice").param("q", query.unwrap_or("default"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query_trims_and_accepts() {
        assert_eq!(validate_query("  Inception ").unwrap(), "Inception");
    }

    #[test]
    fn test_validate_query_rejects_empty() {
        assert!(matches!(
            validate_query("   "),
            Err(QueryError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_query_rejects_overlong() {
        let long = "a".repeat(MAX_QUERY_LEN + 1);
        assert!(matches!(
            validate_query(&long),
            Err(QueryError::Validation(_))
        ));
        let exact = "a".repeat(MAX_QUERY_LEN);
        assert!(validate_query(&exact).is_ok());
    }

    #[test]
    fn test_validate_query_limit_counts_characters_not_bytes() {
        // Two bytes per character; the limit must still admit the full
        // character count
        let exact = "é".repeat(MAX_QUERY_LEN);
        assert!(validate_query(&exact).is_ok());
        let over = "é".repeat(MAX_QUERY_LEN + 1);
        assert!(matches!(
            validate_query(&over),
            Err(QueryError::Validation(_))
        ));
    }

    #[test]
    fn test_source_error_translation() {
        assert!(matches!(
            QueryError::from(SourceError::NotFound("x".to_string())),
            QueryError::NotFound(_)
        ));
        assert!(matches!(
            QueryError::from(SourceError::RateLimited),
            QueryError::UpstreamRateLimited
        ));
        assert!(matches!(
            QueryError::from(SourceError::Timeout),
            QueryError::UpstreamTimeout
        ));
        assert!(matches!(
            QueryError::from(SourceError::Malformed("x".to_string())),
            QueryError::Upstream(_)
        ));
    }

    #[test]
    fn test_equivalent_queries_share_record_key() {
        assert_eq!(
            record_key(" Inception ").render(),
            record_key("inception").render()
        );
    }

    #[test]
    fn test_genre_key_includes_all_parameters() {
        let filters = GenreFilters {
            min_rating: Some(70.0),
            language: Some("English".to_string()),
        };
        let with_filters = genre_key("Action", &filters, 2, 10);
        let without = genre_key("Action", &GenreFilters::default(), 2, 10);
        assert_ne!(with_filters.render(), without.render());
    }

    #[test]
    fn test_boxoffice_key_default_vs_query() {
        assert_ne!(
            boxoffice_key(None).render(),
            boxoffice_key(Some("avengers")).render()
        );
        assert_eq!(
            boxoffice_key(Some("Avengers ")).render(),
            boxoffice_key(Some("avengers")).render()
        );
    }
}
