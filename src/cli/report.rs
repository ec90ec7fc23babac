//! The `report` command: the full vibes pipeline
//!
//! Read commits, fetch the play history, correlate, group, assemble, render.
//! Spotify being unreachable or unconfigured never fails the report; it
//! degrades to an all-unknown soundtrack.

use crate::config::UserConfig;
use crate::correlate::{
    correlate, group_runs, Assembler, CommitType, DominantTypePolicy, PlayEvent, VibesReport,
    UNKNOWN_TRACK,
};
use crate::git::CommitLog;
use crate::reporters;
use crate::spotify::SpotifyClient;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

pub struct ReportOptions<'a> {
    pub path: &'a Path,
    pub format: &'a str,
    pub output: Option<&'a Path>,
    pub limit: usize,
    pub plays_limit: usize,
    pub since: Option<DateTime<Utc>>,
    pub fallback_type: CommitType,
    pub playlist: bool,
    pub open_output: bool,
}

pub fn run(options: ReportOptions<'_>) -> Result<()> {
    let log = CommitLog::open(options.path)?;

    let pb = spinner("Reading git history...");
    let commits = log.recent_commits(options.limit, options.since)?;
    pb.finish_and_clear();

    let client = connect_spotify();

    let plays: Vec<PlayEvent> = match &client {
        Some(client) => {
            let pb = spinner("Fetching listening history...");
            let plays = client.recently_played(options.plays_limit).unwrap_or_else(|err| {
                warn!("Listening history fetch failed: {err}");
                Vec::new()
            });
            pb.finish_and_clear();
            plays
        }
        None => Vec::new(),
    };

    let assigned = correlate(&commits, &plays);
    let skeletons = group_runs(&assigned);

    // Prefetch metadata for every distinct assigned track in one batch so
    // the assembler's resolver never goes back to the network.
    let mut distinct: Vec<String> = Vec::new();
    for skeleton in &skeletons {
        if skeleton.track_id != UNKNOWN_TRACK && !distinct.contains(&skeleton.track_id) {
            distinct.push(skeleton.track_id.clone());
        }
    }
    let metadata: HashMap<_, _> = match &client {
        Some(client) if !distinct.is_empty() => {
            let pb = spinner("Fetching track metadata...");
            let resolved = client.resolve_tracks(&distinct);
            pb.finish_and_clear();
            resolved
        }
        _ => HashMap::new(),
    };

    if options.playlist {
        match &client {
            Some(client) => {
                let pb = spinner("Syncing Spotify playlist...");
                let synced = client.sync_playlist(&distinct);
                pb.finish_and_clear();
                match synced {
                    Ok(url) => println!("Playlist synced: {url}"),
                    Err(err) => warn!("Playlist sync failed: {err}"),
                }
            }
            None => warn!("Spotify not configured; skipping playlist sync"),
        }
    }

    let policy = DominantTypePolicy {
        fallback: options.fallback_type,
    };
    let groups = Assembler::new(policy).assemble(&skeletons, |id| metadata.get(id).cloned());
    let report = VibesReport {
        total_commits: commits.len(),
        total_tracks: groups.len(),
        groups,
    };

    let rendered = reporters::report(&report, options.format)?;
    match options.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!(
                "Generated vibes report: {} tracks, {} commits",
                report.total_tracks, report.total_commits
            );
            println!("  {}", path.display());

            if options.open_output {
                if let Err(err) = open::that(path) {
                    warn!("Could not open {}: {err}", path.display());
                }
            }
        }
        None => {
            if options.open_output {
                warn!("--open requires --output; nothing to open");
            }
            print!("{rendered}");
        }
    }

    Ok(())
}

/// Spotify is optional: missing credentials or a failed refresh degrade the
/// report rather than aborting it.
fn connect_spotify() -> Option<SpotifyClient> {
    let config = match UserConfig::load() {
        Ok(config) => config,
        Err(err) => {
            warn!("Config load failed: {err}");
            return None;
        }
    };
    match SpotifyClient::from_config(&config) {
        Ok(client) => Some(client),
        Err(err) => {
            warn!("Spotify unavailable, correlating without play history: {err}");
            None
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("static template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
