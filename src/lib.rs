//! Vibes - commit soundtrack reports
//!
//! Correlates a repository's commit history with the author's Spotify
//! listening history and renders the commits grouped by the track that was
//! playing when they were written.
//!
//! The correlation engine itself lives in [`correlate`] and is a pure
//! library boundary: no I/O, no shared state, deterministic output. The
//! surrounding modules are its collaborators: [`git`] reads the commit log,
//! [`spotify`] fetches play history and track metadata, [`reporters`]
//! renders the finished report.

pub mod cli;
pub mod config;
pub mod correlate;
pub mod git;
pub mod reporters;
pub mod spotify;
