//! Box-office ranking and lightweight recommendations
//!
//! Pure ranking over a movie collection: order by box-office gross
//! descending with a title tie-break, assign dense 1-based ranks, and
//! attach a small recommendation set per entry. Recommendations are a
//! deterministic heuristic over the same input set, not a learned model:
//! the same collection always produces the same output.

use serde::{Deserialize, Serialize};

use crate::data::MovieRecord;
use crate::ratings::{self, RatingSummary};

/// Maximum number of recommendations attached to each entry
pub const RECOMMENDATION_LIMIT: usize = 3;

/// Composite rating a movie must exceed to be recommended
pub const RECOMMENDATION_MIN_COMPOSITE: f64 = 70.0;

/// One ranked box-office entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxOfficeEntry {
    /// 1-based dense rank (no gaps)
    pub rank: u32,
    /// The ranked movie
    pub record: MovieRecord,
    /// Normalized rating summary for the movie
    pub summary: RatingSummary,
    /// Titles of up to [`RECOMMENDATION_LIMIT`] other movies from the
    /// same set sharing at least one genre, best-rated first
    pub recommendations: Vec<String>,
}

/// Ranks a movie collection by box-office gross
///
/// Sort key: box-office amount descending (a missing figure ranks as
/// zero), tie-break by title ascending case-insensitive. Ranks are
/// dense and 1-based.
pub fn rank(records: &[MovieRecord]) -> Vec<BoxOfficeEntry> {
    let mut ordered: Vec<(MovieRecord, RatingSummary)> = records
        .iter()
        .map(|record| (record.clone(), ratings::summarize(record)))
        .collect();

    ordered.sort_by(|(a, _), (b, _)| {
        b.box_office
            .unwrap_or(0)
            .cmp(&a.box_office.unwrap_or(0))
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });

    ordered
        .iter()
        .enumerate()
        .map(|(index, (record, summary))| BoxOfficeEntry {
            rank: index as u32 + 1,
            record: record.clone(),
            summary: summary.clone(),
            recommendations: recommend(record, &ordered),
        })
        .collect()
}

/// Picks recommendations for one entry from the full set
///
/// Candidates must share at least one genre with the entry, have a
/// composite rating above [`RECOMMENDATION_MIN_COMPOSITE`], and are
/// ordered by composite descending with a title tie-break; the entry
/// itself is excluded.
fn recommend(entry: &MovieRecord, all: &[(MovieRecord, RatingSummary)]) -> Vec<String> {
    let mut candidates: Vec<(&MovieRecord, f64)> = all
        .iter()
        .filter(|(candidate, _)| !is_same_movie(candidate, entry))
        .filter(|(candidate, _)| candidate.shares_genre_with(entry))
        .filter_map(|(candidate, summary)| {
            summary
                .composite
                .filter(|c| *c > RECOMMENDATION_MIN_COMPOSITE)
                .map(|c| (candidate, c))
        })
        .collect();

    candidates.sort_by(|(a, ra), (b, rb)| {
        rb.partial_cmp(ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });

    candidates
        .into_iter()
        .take(RECOMMENDATION_LIMIT)
        .map(|(candidate, _)| candidate.title.clone())
        .collect()
}

/// Two records refer to the same movie when their ids match, falling
/// back to a case-insensitive title comparison when ids are absent
fn is_same_movie(a: &MovieRecord, b: &MovieRecord) -> bool {
    match (&a.imdb_id, &b.imdb_id) {
        (Some(ida), Some(idb)) => ida == idb,
        _ => a.title.eq_ignore_ascii_case(&b.title),
    }
}
