//! Refresh-grant token exchange
//!
//! Full OAuth acquisition is out of scope for this tool; this only trades
//! an already-provisioned refresh token for a fresh access token.

use super::{SpotifyError, SpotifyResult};
use serde::Deserialize;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub(crate) fn refresh_access_token(
    agent: &ureq::Agent,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> SpotifyResult<String> {
    let response = agent
        .post(TOKEN_URL)
        .send_form([
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .map_err(|e| SpotifyError::RefreshFailed(e.to_string()))?;

    let status = response.status().as_u16();
    if status >= 400 {
        let body = response.into_body().read_to_string().unwrap_or_default();
        return Err(SpotifyError::RefreshFailed(format!("{status}: {body}")));
    }

    let token: TokenResponse = response
        .into_body()
        .read_json()
        .map_err(|e| SpotifyError::ParseError(e.to_string()))?;
    Ok(token.access_token)
}
