//! Integration tests for CLI argument handling
//!
//! Runs the built binary with various argument sets and checks exit
//! status plus the help/error surface. Anything that would hit the
//! network is exercised only through --help or flag-parse failures.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cinecache"))
        .args(args)
        .output()
        .expect("Failed to execute cinecache")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cinecache"), "Help should mention cinecache");
    assert!(stdout.contains("search"), "Help should list the search subcommand");
    assert!(stdout.contains("boxoffice"), "Help should list the boxoffice subcommand");
    assert!(stdout.contains("--ttl"), "Help should mention the --ttl flag");
}

#[test]
fn test_subcommand_help_exits_successfully() {
    let output = run_cli(&["genre", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--page-size"));
    assert!(stdout.contains("--rating"));
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success(), "Expected bare invocation to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Usage") || stderr.contains("usage"),
        "Should print usage on missing subcommand: {}",
        stderr
    );
}

#[test]
fn test_unknown_subcommand_fails() {
    let output = run_cli(&["tickets"]);
    assert!(!output.status.success());
}

#[test]
fn test_non_numeric_ttl_fails() {
    let output = run_cli(&["--ttl", "soon", "search", "Inception"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid") || stderr.contains("Invalid"),
        "Should report an invalid --ttl value: {}",
        stderr
    );
}

#[test]
fn test_missing_api_key_prints_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_cinecache"))
        .args(["search", "Inception"])
        .env_remove("OMDB_API_KEY")
        .output()
        .expect("Failed to execute cinecache");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("OMDB_API_KEY"),
        "Should point at the missing API key: {}",
        stderr
    );
}

#[cfg(test)]
mod unit_tests {
    //! Parse checks that don't require running the binary

    use clap::Parser;
    use cinecache::cli::{Cli, Command};

    #[test]
    fn test_ratings_accepts_many_titles() {
        let cli = Cli::parse_from(["cinecache", "ratings", "Inception", "Heat", "Alien"]);
        match cli.command {
            Command::Ratings { titles } => assert_eq!(titles.len(), 3),
            other => panic!("expected Ratings, got {other:?}"),
        }
    }

    #[test]
    fn test_genre_defaults_to_first_page() {
        let cli = Cli::parse_from(["cinecache", "genre", "drama"]);
        match cli.command {
            Command::Genre {
                page, page_size, ..
            } => {
                assert_eq!(page, 1);
                assert_eq!(page_size, 10);
            }
            other => panic!("expected Genre, got {other:?}"),
        }
    }

    #[test]
    fn test_refresh_flag_with_subcommand() {
        let cli = Cli::parse_from(["cinecache", "--refresh", "genres", "Inception"]);
        assert!(cli.refresh);
        match cli.command {
            Command::Genres { title } => assert_eq!(title, "Inception"),
            other => panic!("expected Genres, got {other:?}"),
        }
    }
}
