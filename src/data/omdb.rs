//! OMDb metadata API client
//!
//! This module provides the upstream source client: it fetches a single
//! movie record by title or IMDb id, or a page of search hits, and
//! classifies failures into the error kinds the orchestrator's retry and
//! batch logic depend on. The client performs no caching and makes a
//! single attempt per call.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::{MovieRecord, MovieSource, SearchHit};

/// Base URL for the OMDb API
const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// Default per-request timeout for upstream calls
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when fetching movie data from the upstream source
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The upstream reports no match for the query
    #[error("movie not found: {0}")]
    NotFound(String),

    /// The upstream signaled throttling (HTTP 429)
    #[error("upstream rate limit exceeded")]
    RateLimited,

    /// No response within the bounded request interval
    #[error("upstream request timed out")]
    Timeout,

    /// The response failed schema validation or could not be decoded
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// Client for fetching movie metadata from the OMDb API
#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl OmdbClient {
    /// Create a new OmdbClient with the given API key and default timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a new OmdbClient with a custom request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the detail record for a single movie by title or IMDb id
    ///
    /// # Arguments
    /// * `title_or_id` - An IMDb id (e.g. "tt1375666") or a movie title
    ///
    /// # Returns
    /// * `Ok(MovieRecord)` - The parsed movie record
    /// * `Err(SourceError)` - Classified upstream failure
    pub async fn fetch_detail(&self, title_or_id: &str) -> Result<MovieRecord, SourceError> {
        let ident = title_or_id.trim();
        let lookup_param = if is_imdb_id(ident) { "i" } else { "t" };

        let response = self
            .client
            .get(OMDB_BASE_URL)
            .query(&[("apikey", self.api_key.as_str()), (lookup_param, ident)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_request_error)?;

        let text = check_status(response).await?;
        let detail: OmdbDetail = serde_json::from_str(&text)
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        detail_to_record(detail)
    }

    /// Fetch one page of search hits for a free-text term
    ///
    /// # Arguments
    /// * `term` - The search term
    /// * `page` - 1-based result page
    ///
    /// # Returns
    /// * `Ok(Vec<SearchHit>)` - Search hits on that page
    /// * `Err(SourceError)` - `NotFound` when the upstream reports no
    ///   matches, otherwise a classified upstream failure
    pub async fn search_page(&self, term: &str, page: u32) -> Result<Vec<SearchHit>, SourceError> {
        let page = page.max(1).to_string();
        let response = self
            .client
            .get(OMDB_BASE_URL)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("s", term.trim()),
                ("type", "movie"),
                ("page", page.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_request_error)?;

        let text = check_status(response).await?;
        let payload: OmdbSearchPayload = serde_json::from_str(&text)
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        search_payload_to_hits(payload, term)
    }
}

impl MovieSource for OmdbClient {
    async fn fetch(&self, title_or_id: &str) -> Result<MovieRecord, SourceError> {
        self.fetch_detail(title_or_id).await
    }

    async fn search(&self, term: &str, page: u32) -> Result<Vec<SearchHit>, SourceError> {
        self.search_page(term, page).await
    }
}

/// Classify a reqwest transport error into a SourceError
///
/// Timeouts and connection failures both present as "no response within
/// the bounded interval"; anything else means the exchange itself was
/// broken and is treated as a malformed response.
fn classify_request_error(error: reqwest::Error) -> SourceError {
    if error.is_timeout() || error.is_connect() {
        SourceError::Timeout
    } else {
        SourceError::Malformed(error.to_string())
    }
}

/// Check the HTTP status and return the response body on success
async fn check_status(response: reqwest::Response) -> Result<String, SourceError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited);
    }
    if !status.is_success() {
        return Err(SourceError::Malformed(format!(
            "unexpected HTTP status {status}"
        )));
    }
    response.text().await.map_err(classify_request_error)
}

/// Returns true when the identifier looks like an IMDb id ("tt" + digits)
///
/// Compares on bytes: titles may hold multi-byte characters at any
/// position, so string slicing is off limits here.
fn is_imdb_id(ident: &str) -> bool {
    let bytes = ident.as_bytes();
    bytes.len() > 2
        && bytes[..2].eq_ignore_ascii_case(b"tt")
        && bytes[2..].iter().all(u8::is_ascii_digit)
}

/// Parse the leading 4-digit year from an OMDb year string
///
/// OMDb reports years as "2010" but also as ranges like "2008–2013".
fn parse_year(year: &str) -> Option<i32> {
    let digits: String = year.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

/// Parse a box-office label like "$2,923,706,026" into whole dollars
///
/// "N/A", empty, or digit-free labels yield `None` rather than zero so a
/// missing figure is never mistaken for a real one.
pub fn parse_box_office(label: Option<&str>) -> Option<u64> {
    let label = label?.trim();
    if label.is_empty() || label == "N/A" {
        return None;
    }
    let digits: String = label.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Converts an OMDb detail payload into a MovieRecord
fn detail_to_record(detail: OmdbDetail) -> Result<MovieRecord, SourceError> {
    if detail.response != "True" {
        let message = detail
            .error
            .unwrap_or_else(|| "no match reported by upstream".to_string());
        return Err(SourceError::NotFound(message));
    }

    let title = detail
        .title
        .ok_or_else(|| SourceError::Malformed("detail payload missing Title".to_string()))?;

    let genres = detail
        .genre
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty() && *g != "N/A")
        .map(str::to_string)
        .collect();

    let mut ratings = BTreeMap::new();
    for rating in detail.ratings {
        if !rating.source.is_empty() && !rating.value.is_empty() {
            ratings.insert(rating.source, rating.value);
        }
    }

    let language = detail
        .language
        .filter(|l| !l.trim().is_empty() && l != "N/A");

    Ok(MovieRecord {
        title,
        year: detail.year.as_deref().and_then(parse_year),
        genres,
        language,
        ratings,
        box_office: parse_box_office(detail.box_office.as_deref()),
        imdb_id: detail.imdb_id,
    })
}

/// Converts an OMDb search payload into a list of SearchHit
fn search_payload_to_hits(
    payload: OmdbSearchPayload,
    term: &str,
) -> Result<Vec<SearchHit>, SourceError> {
    if payload.response != "True" {
        let message = payload
            .error
            .unwrap_or_else(|| format!("no results for '{term}'"));
        return Err(SourceError::NotFound(message));
    }

    Ok(payload
        .search
        .into_iter()
        .filter(|item| !item.title.is_empty())
        .map(|item| SearchHit {
            title: item.title,
            year: item.year,
            imdb_id: item.imdb_id,
        })
        .collect())
}

/// OMDb detail response structure
#[derive(Debug, Deserialize)]
struct OmdbDetail {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Language")]
    language: Option<String>,
    #[serde(rename = "Ratings", default)]
    ratings: Vec<OmdbRating>,
    #[serde(rename = "BoxOffice")]
    box_office: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
}

/// One per-provider rating entry from OMDb
#[derive(Debug, Deserialize)]
struct OmdbRating {
    #[serde(rename = "Source", default)]
    source: String,
    #[serde(rename = "Value", default)]
    value: String,
}

/// OMDb search response structure
#[derive(Debug, Deserialize)]
struct OmdbSearchPayload {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
}

/// One search hit from OMDb
#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
}
