//! CLI command definitions and handlers

mod doctor;
mod init;
mod recent;
mod report;

use crate::correlate::CommitType;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vibes - commits grouped by the song playing when they were written
#[derive(Parser, Debug)]
#[command(name = "vibes")]
#[command(
    version,
    about = "Correlate your git history with your Spotify listening history",
    long_about = "Vibes reads your repository's commit log and your Spotify listening \
history, works out which track was playing when each commit was written, and \
renders the commits grouped by track as a soundtrack report.",
    after_help = "\
Examples:
  vibes report                         Print the soundtrack for the current repo
  vibes report --format html -o vibes.html   Standalone HTML page
  vibes report --format json           JSON output for scripting
  vibes recent                         Show recently played tracks
  vibes init                           Create the user config file
  vibes doctor                         Check which credentials are configured"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the commit soundtrack report
    #[command(after_help = "\
Examples:
  vibes report                               Terminal output for the current repo
  vibes report /path/to/repo                 A specific repo
  vibes report --format html -o vibes.html   Standalone HTML page
  vibes report --limit 500 --plays 500       Correlate more history
  vibes report --since 2024-03-01            Only commits from March on
  vibes report --playlist                    Sync a Spotify playlist too
  vibes report --fallback-type chore         Dominant type for untyped groups")]
    Report {
        /// Output format: text, json, html
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "html"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Maximum commits to correlate
        #[arg(long, default_value = "200")]
        limit: usize,

        /// Maximum play-history events to fetch
        #[arg(long, default_value = "200")]
        plays: usize,

        /// Only correlate commits made on or after this date
        /// (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_since)]
        since: Option<DateTime<Utc>>,

        /// Dominant type shown for groups in which no commit is typed
        #[arg(long, default_value = "feat")]
        fallback_type: CommitType,

        /// Create/update a "Commit Soundtrack" playlist with the report's tracks
        #[arg(long)]
        playlist: bool,

        /// Open the written output file when done (requires --output)
        #[arg(long)]
        open: bool,
    },

    /// Show recently played tracks (sanity check for credentials)
    Recent {
        /// Number of tracks to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Create the user config file with example settings
    Init,

    /// Check which Spotify credential sources are configured
    Doctor,
}

/// Accepts a bare date (midnight UTC) or a full RFC 3339 timestamp.
fn parse_since(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("'{value}' is not a date (expected YYYY-MM-DD or RFC 3339)"))
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Report {
            format,
            output,
            limit,
            plays,
            since,
            fallback_type,
            playlist,
            open,
        } => report::run(report::ReportOptions {
            path: &cli.path,
            format: &format,
            output: output.as_deref(),
            limit,
            plays_limit: plays,
            since,
            fallback_type,
            playlist,
            open_output: open,
        }),
        Commands::Recent { limit } => recent::run(limit),
        Commands::Init => init::run(),
        Commands::Doctor => doctor::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_since_accepts_bare_date() {
        let parsed = parse_since("2024-03-01").expect("parse date");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_since_accepts_rfc3339() {
        let parsed = parse_since("2024-03-01T12:30:00Z").expect("parse timestamp");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_since_rejects_junk() {
        assert!(parse_since("last tuesday").is_err());
        assert!(parse_since("2024-13-01").is_err());
    }

    #[test]
    fn test_report_flags_parse() {
        let cli = Cli::try_parse_from([
            "vibes",
            "report",
            "--since",
            "2024-03-01",
            "--playlist",
            "--open",
        ])
        .expect("parse args");
        match cli.command {
            Commands::Report {
                since,
                playlist,
                open,
                ..
            } => {
                assert!(since.is_some());
                assert!(playlist);
                assert!(open);
            }
            _ => panic!("expected report command"),
        }
    }
}
