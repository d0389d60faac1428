//! Genre browsing: filtering and deterministic pagination
//!
//! Pure functions over a movie collection: select the records matching a
//! genre plus optional filters, order them deterministically, and cut
//! out one page. Ordering is fixed (composite rating descending, title
//! ascending case-insensitive on ties) so repeated calls with identical
//! inputs return identical pages even if the underlying collection
//! order varies.

use serde::{Deserialize, Serialize};

use crate::data::MovieRecord;
use crate::ratings;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound on requested page size, to bound response size
pub const MAX_PAGE_SIZE: usize = 50;

/// Optional filters combined with logical AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreFilters {
    /// Minimum composite rating (0-100); records without a composite
    /// fail any threshold
    pub min_rating: Option<f64>,
    /// Exact-match language name (case-insensitive)
    pub language: Option<String>,
}

/// One movie on a genre page, with its composite rating attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreItem {
    /// The underlying movie record
    pub record: MovieRecord,
    /// Composite rating from the rating aggregator, when available
    pub composite: Option<f64>,
}

/// One page of a genre browse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenrePage {
    /// The genre that was browsed
    pub genre: String,
    /// Records on this page, in display order
    pub items: Vec<GenreItem>,
    /// 1-based page index as requested
    pub page: i64,
    /// Effective page size after clamping
    pub page_size: usize,
    /// Total matching records across all pages
    pub total: usize,
}

/// Filters, orders, and paginates a movie collection for one genre
///
/// A record matches when it lists the genre (case-insensitive) and
/// passes every active filter. A `page` that is out of range (≤ 0 or
/// beyond the last page) yields an empty item list, never an error;
/// `total` always reflects the full match count before pagination.
pub fn browse(
    records: &[MovieRecord],
    genre: &str,
    filters: &GenreFilters,
    page: i64,
    page_size: usize,
) -> GenrePage {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

    let mut matching: Vec<GenreItem> = records
        .iter()
        .filter(|record| record.has_genre(genre))
        .map(|record| GenreItem {
            composite: ratings::summarize(record).composite,
            record: record.clone(),
        })
        .filter(|item| passes_filters(item, filters))
        .collect();

    sort_by_rating(&mut matching);

    let total = matching.len();
    let items = if page < 1 {
        Vec::new()
    } else {
        let start = (page as usize - 1).saturating_mul(page_size);
        matching.into_iter().skip(start).take(page_size).collect()
    };

    GenrePage {
        genre: genre.to_string(),
        items,
        page,
        page_size,
        total,
    }
}

/// Applies the active filters (logical AND) to one item
fn passes_filters(item: &GenreItem, filters: &GenreFilters) -> bool {
    if let Some(min_rating) = filters.min_rating {
        match item.composite {
            Some(composite) if composite >= min_rating => {}
            _ => return false,
        }
    }
    if let Some(language) = &filters.language {
        let matched = item
            .record
            .language
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .any(|l| l.eq_ignore_ascii_case(language.trim()));
        if !matched {
            return false;
        }
    }
    true
}

/// Orders items by composite rating descending, tie-break by title
/// ascending (case-insensitive). Records without a composite sort last.
fn sort_by_rating(items: &mut [GenreItem]) {
    items.sort_by(|a, b| {
        let ra = a.composite.unwrap_or(-1.0);
        let rb = b.composite.unwrap_or(-1.0);
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.record.title.to_lowercase().cmp(&b.record.title.to_lowercase()))
    });
}
