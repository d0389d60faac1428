//! Cinecache CLI - query movie information through a TTL-cached core
//!
//! Parses the command line, wires up the cache store and OMDb client
//! once, runs a single query through the orchestrator, and prints the
//! result as pretty JSON. Diagnostics go to stderr via tracing so
//! stdout stays machine-readable.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use cinecache::cache::{CacheKey, CacheStore};
use cinecache::cli::{Cli, Command};
use cinecache::data::OmdbClient;
use cinecache::genre::GenreFilters;
use cinecache::orchestrator::{
    boxoffice_key, genre_key, genres_key, record_key, summary_key, Orchestrator,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("OMDB_API_KEY")
        .map_err(|_| "OMDB_API_KEY environment variable is required")?;

    let cache = match &cli.cache_dir {
        Some(dir) => CacheStore::with_dir(dir.clone()),
        None => CacheStore::new()
            .ok_or("could not determine a cache directory; pass --cache-dir")?,
    };
    let orchestrator = Orchestrator::new(OmdbClient::new(api_key), cache).with_ttl(cli.ttl);

    if cli.refresh {
        for key in refresh_keys(&cli.command) {
            orchestrator.invalidate(&key);
        }
    }

    match &cli.command {
        Command::Search { query } => print_json(&orchestrator.search(query).await?),
        Command::Ratings { titles } if titles.len() == 1 => {
            print_json(&orchestrator.ratings_summary(&titles[0]).await?)
        }
        Command::Ratings { titles } => {
            let results = orchestrator.ratings_summary_batch(titles).await?;
            let items: Vec<serde_json::Value> = results
                .into_iter()
                .map(|result| match result {
                    Ok(summary) => serde_json::to_value(summary).unwrap_or_default(),
                    Err(error) => json!({ "error": error.to_string() }),
                })
                .collect();
            print_json(&items)
        }
        Command::Genres { title } => print_json(&orchestrator.genres(title).await?),
        Command::Genre {
            name,
            page,
            page_size,
            rating,
            language,
        } => {
            let filters = GenreFilters {
                min_rating: *rating,
                language: language.clone(),
            };
            print_json(
                &orchestrator
                    .browse_genre(name, &filters, *page, *page_size)
                    .await?,
            )
        }
        Command::Boxoffice { query } => {
            print_json(&orchestrator.boxoffice_top(query.as_deref()).await?)
        }
    }
}

/// The cache keys --refresh should invalidate for a given command
fn refresh_keys(command: &Command) -> Vec<CacheKey> {
    match command {
        Command::Search { query } => vec![record_key(query)],
        Command::Ratings { titles } => titles
            .iter()
            .flat_map(|title| [summary_key(title), record_key(title)])
            .collect(),
        Command::Genres { title } => vec![genres_key(title), record_key(title)],
        Command::Genre {
            name,
            page,
            page_size,
            rating,
            language,
        } => {
            let filters = GenreFilters {
                min_rating: *rating,
                language: language.clone(),
            };
            vec![genre_key(name, &filters, *page, *page_size)]
        }
        Command::Boxoffice { query } => vec![boxoffice_key(query.as_deref())],
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
