//! The `recent` command: recently played tracks
//!
//! A quick way to verify credentials work before generating a report.

use crate::config::UserConfig;
use crate::spotify::SpotifyClient;
use anyhow::Result;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

pub fn run(limit: usize) -> Result<()> {
    let config = UserConfig::load()?;
    let client = SpotifyClient::from_config(&config)?;

    let plays = client.recently_played(limit)?;
    if plays.is_empty() {
        println!("No recent listening history.");
        return Ok(());
    }

    let mut ids: Vec<String> = Vec::new();
    for play in &plays {
        if !ids.contains(&play.track_id) {
            ids.push(play.track_id.clone());
        }
    }
    let metadata = client.resolve_tracks(&ids);

    println!("\n{BOLD}Recently Played{RESET}");
    // Newest first, the way the Spotify client UI shows it
    for play in plays.iter().rev() {
        let when = play.played_at.format("%b %-d %H:%M");
        match metadata.get(&play.track_id) {
            Some(meta) => println!(
                "  {DIM}{when}{RESET}  {BOLD}{}{RESET} {DIM}·{RESET} {}",
                meta.name, meta.artist
            ),
            None => println!("  {DIM}{when}{RESET}  {}", play.track_id),
        }
    }
    println!();

    Ok(())
}
