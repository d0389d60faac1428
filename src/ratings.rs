//! Rating normalization and aggregation
//!
//! Each rating provider reports scores on its own scale. This module
//! normalizes provider scores to a common 0-100 scale using a static
//! provider table and computes a composite score per movie. The
//! composite is the mean of the scores that are actually available:
//! absent or unparsable provider scores are excluded, never counted as
//! zero, and a movie with no usable scores has no composite at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::MovieRecord;

/// The raw scale a provider reports scores on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Already 0-100; passes through unchanged
    ZeroToHundred,
    /// 0-10; multiplied by 10
    ZeroToTen,
    /// Percentage string like "87%"; parsed directly
    Percent,
}

/// Provider-to-scale table. Adding a provider is a data change here, not
/// a control-flow change anywhere else.
static PROVIDER_SCALES: [(&str, Scale); 3] = [
    ("Internet Movie Database", Scale::ZeroToTen),
    ("Rotten Tomatoes", Scale::Percent),
    ("Metacritic", Scale::ZeroToHundred),
];

/// Minimum spread between two providers' normalized scores worth logging
const DISCREPANCY_THRESHOLD: f64 = 5.0;

/// Normalized multi-provider rating summary for a single movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Movie title
    pub title: String,
    /// Normalized 0-100 score per provider that reported one
    pub scores: BTreeMap<String, f64>,
    /// Mean of the available normalized scores; `None` when no provider
    /// reported a usable score
    pub composite: Option<f64>,
    /// Number of providers contributing to the composite
    pub provider_count: usize,
}

/// Looks up the scale for a provider (case-insensitive)
fn provider_scale(provider: &str) -> Option<Scale> {
    PROVIDER_SCALES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(provider.trim()))
        .map(|(_, scale)| *scale)
}

/// Normalizes a raw provider score string to the 0-100 scale
///
/// Raw values may carry a `/denominator` suffix ("8.8/10", "74/100") or
/// a percent sign ("87%"); the leading numeric part is what gets scaled.
/// Unknown providers and unparsable or out-of-range values yield `None`.
pub fn normalize(provider: &str, raw: &str) -> Option<f64> {
    let scale = provider_scale(provider)?;
    let numerator = raw
        .split('/')
        .next()?
        .trim()
        .trim_end_matches('%')
        .trim();
    let value: f64 = numerator.parse().ok()?;

    let score = match scale {
        Scale::ZeroToHundred | Scale::Percent => value,
        Scale::ZeroToTen => value * 10.0,
    };
    if (0.0..=100.0).contains(&score) {
        Some(round2(score))
    } else {
        None
    }
}

/// Builds the normalized rating summary for a single record
pub fn summarize(record: &MovieRecord) -> RatingSummary {
    let mut scores = BTreeMap::new();
    for (provider, raw) in &record.ratings {
        if let Some(score) = normalize(provider, raw) {
            scores.insert(provider.clone(), score);
        }
    }

    log_discrepancy(&record.title, &scores);

    let provider_count = scores.len();
    let composite = if provider_count == 0 {
        None
    } else {
        Some(round2(
            scores.values().sum::<f64>() / provider_count as f64,
        ))
    };

    RatingSummary {
        title: record.title.clone(),
        scores,
        composite,
        provider_count,
    }
}

/// Builds summaries for a batch of records, positionally aligned with
/// the input
pub fn summarize_batch(records: &[MovieRecord]) -> Vec<RatingSummary> {
    records.iter().map(summarize).collect()
}

/// Logs when providers disagree by more than the discrepancy threshold
fn log_discrepancy(title: &str, scores: &BTreeMap<String, f64>) {
    if scores.len() < 2 {
        return;
    }
    let max = scores.values().cloned().fold(f64::MIN, f64::max);
    let min = scores.values().cloned().fold(f64::MAX, f64::min);
    if max - min > DISCREPANCY_THRESHOLD {
        info!(title = %title, spread = max - min, ?scores, "provider rating discrepancy");
    }
}

/// Rounds to two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
