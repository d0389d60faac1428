//! Command-line interface parsing for cinecache
//!
//! This module defines the clap CLI: one subcommand per query the
//! orchestrator answers, plus global cache controls (--ttl, --refresh,
//! --cache-dir).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::genre::DEFAULT_PAGE_SIZE;
use crate::orchestrator::DEFAULT_TTL_SECS;

/// Cinecache - movie information with caching, rating aggregation,
/// genre browsing, and box-office rankings
#[derive(Parser, Debug)]
#[command(name = "cinecache")]
#[command(about = "Query movie information through a TTL-cached OMDb client")]
#[command(version)]
pub struct Cli {
    /// Cache freshness window in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TTL_SECS)]
    pub ttl: u64,

    /// Invalidate this query's cache entry before running
    #[arg(long)]
    pub refresh: bool,

    /// Cache directory (defaults to the XDG cache dir)
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// One subcommand per query surface
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up a single movie by title or IMDb id
    Search {
        /// Movie title or IMDb id (e.g. "Inception" or tt1375666)
        query: String,
    },

    /// Summarize normalized ratings for one or more titles
    ///
    /// With a single title, prints one summary; with several, prints an
    /// array aligned with the input where each position holds either a
    /// summary or the error for that title.
    Ratings {
        /// Titles (or IMDb ids) to summarize
        #[arg(required = true)]
        titles: Vec<String>,
    },

    /// List the genre names for a title
    Genres {
        /// Movie title or IMDb id
        title: String,
    },

    /// Browse a genre with filters and pagination
    Genre {
        /// Genre name (e.g. action, drama, sci-fi)
        name: String,

        /// 1-based page index
        #[arg(long, default_value_t = 1)]
        page: i64,

        /// Items per page
        #[arg(long, value_name = "N", default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Minimum composite rating (0-100)
        #[arg(long, value_name = "MIN")]
        rating: Option<f64>,

        /// Exact-match language name
        #[arg(long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Rank movies by box-office gross, with recommendations
    Boxoffice {
        /// Optional search query; the curated all-time list is used
        /// when omitted
        query: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["cinecache", "search", "Inception"]);
        match cli.command {
            Command::Search { query } => assert_eq!(query, "Inception"),
            other => panic!("expected Search, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["cinecache", "search", "Inception"]);
        assert_eq!(cli.ttl, DEFAULT_TTL_SECS);
        assert!(!cli.refresh);
        assert!(cli.cache_dir.is_none());
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from([
            "cinecache",
            "--ttl",
            "60",
            "--refresh",
            "--cache-dir",
            "/tmp/cc",
            "search",
            "Inception",
        ]);
        assert_eq!(cli.ttl, 60);
        assert!(cli.refresh);
        assert_eq!(cli.cache_dir.as_deref(), Some(std::path::Path::new("/tmp/cc")));
    }

    #[test]
    fn test_parse_ratings_multiple_titles() {
        let cli = Cli::parse_from(["cinecache", "ratings", "Inception", "Heat"]);
        match cli.command {
            Command::Ratings { titles } => assert_eq!(titles, vec!["Inception", "Heat"]),
            other => panic!("expected Ratings, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ratings_requires_a_title() {
        assert!(Cli::try_parse_from(["cinecache", "ratings"]).is_err());
    }

    #[test]
    fn test_parse_genre_with_filters() {
        let cli = Cli::parse_from([
            "cinecache",
            "genre",
            "action",
            "--page",
            "2",
            "--page-size",
            "5",
            "--rating",
            "70",
            "--language",
            "English",
        ]);
        match cli.command {
            Command::Genre {
                name,
                page,
                page_size,
                rating,
                language,
            } => {
                assert_eq!(name, "action");
                assert_eq!(page, 2);
                assert_eq!(page_size, 5);
                assert_eq!(rating, Some(70.0));
                assert_eq!(language.as_deref(), Some("English"));
            }
            other => panic!("expected Genre, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_genre_rejects_non_numeric_rating() {
        assert!(Cli::try_parse_from(["cinecache", "genre", "action", "--rating", "high"]).is_err());
    }

    #[test]
    fn test_parse_boxoffice_query_is_optional() {
        let cli = Cli::parse_from(["cinecache", "boxoffice"]);
        match cli.command {
            Command::Boxoffice { query } => assert!(query.is_none()),
            other => panic!("expected Boxoffice, got {other:?}"),
        }

        let cli = Cli::parse_from(["cinecache", "boxoffice", "avengers"]);
        match cli.command {
            Command::Boxoffice { query } => assert_eq!(query.as_deref(), Some("avengers")),
            other => panic!("expected Boxoffice, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["cinecache"]).is_err());
    }
}
