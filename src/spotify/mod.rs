//! Spotify Web API collaborators
//!
//! Everything network-facing lives behind this module: the listening
//! history fetch, track metadata resolution, and the refresh-grant token
//! exchange. The correlation engine never sees any of it; failures here
//! degrade a report, they do not abort it.

mod auth;
mod client;

pub use client::SpotifyClient;

use thiserror::Error;

/// Errors from the Spotify boundary.
#[derive(Error, Debug)]
pub enum SpotifyError {
    #[error("No Spotify credentials configured. Run `vibes init` and fill in the config file")]
    MissingCredentials,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

pub type SpotifyResult<T> = Result<T, SpotifyError>;
