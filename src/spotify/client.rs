//! Spotify Web API client (sync HTTP via ureq)
//!
//! Covers exactly what the report needs: the listening history and track
//! display metadata, plus an unauthenticated oEmbed fallback for ids the
//! API does not return.

use super::{auth, SpotifyError, SpotifyResult};
use crate::config::UserConfig;
use crate::correlate::{PlayEvent, TrackMetadata};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, warn};

const API_BASE: &str = "https://api.spotify.com/v1";
const OEMBED_URL: &str = "https://open.spotify.com/oembed";
/// Spotify caps both the history and the tracks endpoint at 50 items.
const PAGE_SIZE: usize = 50;
/// Playlist track writes are capped at 100 uris per request.
const TRACK_WRITE_CAP: usize = 100;

const PLAYLIST_NAME: &str = "Commit Soundtrack";
const PLAYLIST_DESCRIPTION: &str =
    "Every track that was playing when code was committed. Auto-generated by vibes.";

pub struct SpotifyClient {
    agent: ureq::Agent,
    access_token: String,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(std::time::Duration::from_secs(30)))
        .build()
        .new_agent()
}

impl SpotifyClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            agent: make_agent(),
            access_token: access_token.into(),
        }
    }

    /// Build a client from user config, running the refresh grant when only
    /// a refresh token is configured.
    pub fn from_config(config: &UserConfig) -> SpotifyResult<Self> {
        if let Some(token) = config.access_token() {
            return Ok(Self::new(token));
        }

        let (Some(id), Some(secret), Some(refresh)) = (
            config.client_id(),
            config.client_secret(),
            config.refresh_token(),
        ) else {
            return Err(SpotifyError::MissingCredentials);
        };

        let agent = make_agent();
        let access_token = auth::refresh_access_token(&agent, id, secret, refresh)?;
        debug!("Refreshed Spotify access token");
        Ok(Self {
            agent,
            access_token,
        })
    }

    /// Fetch the listening history, oldest first.
    ///
    /// Pages backwards through `me/player/recently-played` with the
    /// `before` cursor until `limit` events are collected or history runs
    /// out. The result is sorted ascending by `played_at` and deduplicated,
    /// which is what the correlation engine requires of its input.
    pub fn recently_played(&self, limit: usize) -> SpotifyResult<Vec<PlayEvent>> {
        let mut events: Vec<PlayEvent> = Vec::new();
        let mut before: Option<String> = None;

        while events.len() < limit {
            let page = self.recently_played_page(before.as_deref())?;
            if page.items.is_empty() {
                break;
            }
            events.extend(page.items.iter().filter_map(play_event_from_item));

            before = page.cursors.and_then(|c| c.before);
            if before.is_none() {
                break;
            }
        }

        events.sort_by(|a, b| {
            a.played_at
                .cmp(&b.played_at)
                .then_with(|| a.track_id.cmp(&b.track_id))
        });
        events.dedup_by(|a, b| a.played_at == b.played_at && a.track_id == b.track_id);
        // Keep the newest `limit` events
        if events.len() > limit {
            events.drain(..events.len() - limit);
        }
        debug!("Fetched {} play events", events.len());
        Ok(events)
    }

    fn recently_played_page(&self, before: Option<&str>) -> SpotifyResult<RecentlyPlayedResponse> {
        let mut request = self
            .agent
            .get(format!("{API_BASE}/me/player/recently-played"))
            .header("Authorization", &format!("Bearer {}", self.access_token))
            .query("limit", &PAGE_SIZE.to_string());
        if let Some(cursor) = before {
            request = request.query("before", cursor);
        }
        let response = request
            .call()
            .map_err(|e| SpotifyError::RequestFailed(e.to_string()))?;
        read_json(response)
    }

    /// Resolve display metadata for a set of track ids, keyed by id.
    ///
    /// Ids are fetched in chunks of 50 (API cap). Ids the API does not
    /// return are simply absent from the map.
    pub fn tracks(&self, track_ids: &[String]) -> SpotifyResult<HashMap<String, TrackMetadata>> {
        let mut resolved = HashMap::new();
        for chunk in track_ids.chunks(PAGE_SIZE) {
            let response = self
                .agent
                .get(format!("{API_BASE}/tracks"))
                .header("Authorization", &format!("Bearer {}", self.access_token))
                .query("ids", &chunk.join(","))
                .call()
                .map_err(|e| SpotifyError::RequestFailed(e.to_string()))?;
            let page: TracksResponse = read_json(response)?;
            for track in page.tracks.into_iter().flatten() {
                resolved.insert(track.id.clone(), track_metadata(track));
            }
        }
        Ok(resolved)
    }

    /// oEmbed fallback for a single track: no auth, name and thumbnail only.
    pub fn track_via_oembed(&self, track_id: &str) -> Option<TrackMetadata> {
        let track_url = format!("https://open.spotify.com/track/{track_id}");
        let response = self
            .agent
            .get(OEMBED_URL)
            .query("url", &track_url)
            .call()
            .ok()?;
        if response.status().as_u16() >= 400 {
            return None;
        }
        let oembed: OEmbedResponse = response.into_body().read_json().ok()?;
        let thumbnail = oembed.thumbnail_url.unwrap_or_default();
        Some(TrackMetadata {
            track_id: track_id.to_string(),
            name: oembed
                .title
                .unwrap_or_else(|| "Unknown Track".to_string()),
            artist: "Unknown Artist".to_string(),
            album: String::new(),
            // CDN path prefixes select the rendition:
            // 0000b273=640px, 00001e02=300px, 00004851=64px
            image_small: thumbnail.replace("00001e02", "00004851"),
            image_medium: thumbnail.clone(),
            image_large: thumbnail.replace("00001e02", "0000b273"),
        })
    }

    /// Resolve metadata for all ids: API first, oEmbed for the rest.
    ///
    /// Never fails; ids that resolve nowhere are simply absent and callers
    /// fall back to a placeholder.
    pub fn resolve_tracks(&self, track_ids: &[String]) -> HashMap<String, TrackMetadata> {
        let mut resolved = match self.tracks(track_ids) {
            Ok(map) => map,
            Err(err) => {
                warn!("Track metadata fetch failed: {err}");
                HashMap::new()
            }
        };
        for id in track_ids {
            if !resolved.contains_key(id) {
                if let Some(metadata) = self.track_via_oembed(id) {
                    resolved.insert(id.clone(), metadata);
                }
            }
        }
        resolved
    }

    /// Find-or-create the soundtrack playlist and replace its tracks.
    ///
    /// `track_ids` should be in report order and free of the sentinel.
    /// Requires a token with the playlist scopes; callers treat an error
    /// here as a degradation, not an abort. Returns the playlist URL.
    pub fn sync_playlist(&self, track_ids: &[String]) -> SpotifyResult<String> {
        let playlist = match self.find_playlist(PLAYLIST_NAME)? {
            Some(found) => {
                let description = format!(
                    "{PLAYLIST_DESCRIPTION} Updated {}.",
                    Utc::now().format("%b %-d, %Y")
                );
                self.update_playlist_description(&found.id, &description)?;
                found
            }
            None => self.create_playlist(PLAYLIST_NAME, PLAYLIST_DESCRIPTION)?,
        };

        if !track_ids.is_empty() {
            self.replace_playlist_tracks(&playlist.id, &track_uris(track_ids))?;
        }
        debug!("Synced playlist {} with {} tracks", playlist.id, track_ids.len());
        Ok(playlist_url(&playlist))
    }

    fn find_playlist(&self, name: &str) -> SpotifyResult<Option<ApiPlaylist>> {
        let response = self
            .agent
            .get(format!("{API_BASE}/me/playlists"))
            .header("Authorization", &format!("Bearer {}", self.access_token))
            .query("limit", &PAGE_SIZE.to_string())
            .call()
            .map_err(|e| SpotifyError::RequestFailed(e.to_string()))?;
        let page: PlaylistsResponse = read_json(response)?;
        Ok(find_by_name(page.items, name))
    }

    fn create_playlist(&self, name: &str, description: &str) -> SpotifyResult<ApiPlaylist> {
        let response = self
            .agent
            .get(format!("{API_BASE}/me"))
            .header("Authorization", &format!("Bearer {}", self.access_token))
            .call()
            .map_err(|e| SpotifyError::RequestFailed(e.to_string()))?;
        let user: ApiUser = read_json(response)?;

        let response = self
            .agent
            .post(format!("{API_BASE}/users/{}/playlists", user.id))
            .header("Authorization", &format!("Bearer {}", self.access_token))
            .send_json(json!({
                "name": name,
                "description": description,
                "public": true,
            }))
            .map_err(|e| SpotifyError::RequestFailed(e.to_string()))?;
        read_json(response)
    }

    fn update_playlist_description(
        &self,
        playlist_id: &str,
        description: &str,
    ) -> SpotifyResult<()> {
        let response = self
            .agent
            .put(format!("{API_BASE}/playlists/{playlist_id}"))
            .header("Authorization", &format!("Bearer {}", self.access_token))
            .send_json(json!({ "description": description }))
            .map_err(|e| SpotifyError::RequestFailed(e.to_string()))?;
        check_status(response)
    }

    /// The first chunk replaces the playlist contents, later chunks append.
    fn replace_playlist_tracks(&self, playlist_id: &str, uris: &[String]) -> SpotifyResult<()> {
        let url = format!("{API_BASE}/playlists/{playlist_id}/tracks");
        for (index, chunk) in uris.chunks(TRACK_WRITE_CAP).enumerate() {
            let body = json!({ "uris": chunk });
            let request = if index == 0 {
                self.agent.put(url.clone())
            } else {
                self.agent.post(url.clone())
            };
            let response = request
                .header("Authorization", &format!("Bearer {}", self.access_token))
                .send_json(&body)
                .map_err(|e| SpotifyError::RequestFailed(e.to_string()))?;
            check_status(response)?;
        }
        Ok(())
    }
}

fn track_uris(track_ids: &[String]) -> Vec<String> {
    track_ids
        .iter()
        .map(|id| format!("spotify:track:{id}"))
        .collect()
}

fn find_by_name(playlists: Vec<ApiPlaylist>, name: &str) -> Option<ApiPlaylist> {
    playlists.into_iter().find(|p| p.name == name)
}

fn playlist_url(playlist: &ApiPlaylist) -> String {
    playlist
        .external_urls
        .spotify
        .clone()
        .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", playlist.id))
}

fn check_status(response: ureq::http::Response<ureq::Body>) -> SpotifyResult<()> {
    let status = response.status().as_u16();
    if status >= 400 {
        let message = response.into_body().read_to_string().unwrap_or_default();
        return Err(SpotifyError::ApiError { status, message });
    }
    Ok(())
}

fn read_json<T>(response: ureq::http::Response<ureq::Body>) -> SpotifyResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status().as_u16();
    if status >= 400 {
        let message = response.into_body().read_to_string().unwrap_or_default();
        return Err(SpotifyError::ApiError { status, message });
    }
    response
        .into_body()
        .read_json()
        .map_err(|e| SpotifyError::ParseError(e.to_string()))
}

fn play_event_from_item(item: &PlayHistoryItem) -> Option<PlayEvent> {
    let track = item.track.as_ref()?;
    let played_at = item.played_at.as_deref()?;
    let played_at = DateTime::parse_from_rfc3339(played_at)
        .ok()?
        .with_timezone(&Utc);
    Some(PlayEvent {
        track_id: track.id.clone(),
        played_at,
        duration: Duration::milliseconds(track.duration_ms.unwrap_or(0)),
    })
}

fn track_metadata(track: ApiTrack) -> TrackMetadata {
    let images: &[ApiImage] = track
        .album
        .as_ref()
        .map(|a| a.images.as_slice())
        .unwrap_or(&[]);
    let image = |index: usize| {
        images
            .get(index)
            .map(|img| img.url.clone())
            .unwrap_or_default()
    };
    TrackMetadata {
        track_id: track.id.clone(),
        name: track.name.clone(),
        artist: track
            .artists
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        album: track
            .album
            .as_ref()
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        // Spotify orders album images largest first
        image_small: image(2),
        image_medium: image(1),
        image_large: image(0),
    }
}

// Spotify API response types

#[derive(Deserialize)]
struct RecentlyPlayedResponse {
    #[serde(default)]
    items: Vec<PlayHistoryItem>,
    cursors: Option<Cursors>,
}

#[derive(Deserialize)]
struct Cursors {
    before: Option<String>,
}

#[derive(Deserialize)]
struct PlayHistoryItem {
    track: Option<ApiTrack>,
    played_at: Option<String>,
}

#[derive(Deserialize)]
struct TracksResponse {
    #[serde(default)]
    tracks: Vec<Option<ApiTrack>>,
}

#[derive(Deserialize)]
struct ApiTrack {
    id: String,
    name: String,
    duration_ms: Option<i64>,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    album: Option<ApiAlbum>,
}

#[derive(Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Deserialize)]
struct ApiAlbum {
    name: Option<String>,
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    thumbnail_url: Option<String>,
}

#[derive(Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Deserialize)]
struct ApiUser {
    id: String,
}

#[derive(Deserialize)]
struct PlaylistsResponse {
    #[serde(default)]
    items: Vec<ApiPlaylist>,
}

#[derive(Deserialize)]
struct ApiPlaylist {
    id: String,
    name: String,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Deserialize, Default)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: &str) -> PlayHistoryItem {
        serde_json::from_str(json).expect("parse item")
    }

    #[test]
    fn test_play_event_mapping() {
        let item = item(
            r#"{
                "played_at": "2024-03-01T12:00:00Z",
                "track": {"id": "t1", "name": "Song", "duration_ms": 215000}
            }"#,
        );
        let event = play_event_from_item(&item).expect("event");
        assert_eq!(event.track_id, "t1");
        assert_eq!(event.duration, Duration::milliseconds(215000));
        assert_eq!(event.window_end() - event.played_at, event.duration);
    }

    #[test]
    fn test_play_event_rejects_malformed_items() {
        assert!(play_event_from_item(&item(r#"{"played_at": "2024-03-01T12:00:00Z"}"#)).is_none());
        assert!(play_event_from_item(&item(
            r#"{"played_at": "not a date", "track": {"id": "t1", "name": "Song"}}"#
        ))
        .is_none());
    }

    #[test]
    fn test_track_metadata_image_order() {
        let track: ApiTrack = serde_json::from_str(
            r#"{
                "id": "t1",
                "name": "Song",
                "artists": [{"name": "Artist"}, {"name": "Second"}],
                "album": {
                    "name": "Album",
                    "images": [
                        {"url": "large.jpg"},
                        {"url": "medium.jpg"},
                        {"url": "small.jpg"}
                    ]
                }
            }"#,
        )
        .expect("parse track");
        let metadata = track_metadata(track);
        assert_eq!(metadata.artist, "Artist");
        assert_eq!(metadata.album, "Album");
        assert_eq!(metadata.image_large, "large.jpg");
        assert_eq!(metadata.image_medium, "medium.jpg");
        assert_eq!(metadata.image_small, "small.jpg");
    }

    #[test]
    fn test_track_metadata_missing_album() {
        let track: ApiTrack =
            serde_json::from_str(r#"{"id": "t1", "name": "Song"}"#).expect("parse track");
        let metadata = track_metadata(track);
        assert_eq!(metadata.artist, "Unknown");
        assert_eq!(metadata.album, "Unknown");
        assert!(metadata.image_large.is_empty());
    }

    #[test]
    fn test_track_uris() {
        let ids = vec!["abc".to_string(), "def".to_string()];
        assert_eq!(
            track_uris(&ids),
            vec!["spotify:track:abc", "spotify:track:def"]
        );
    }

    #[test]
    fn test_find_playlist_requires_exact_name() {
        let page: PlaylistsResponse = serde_json::from_str(
            r#"{
                "items": [
                    {"id": "p1", "name": "Commit Soundtrack (old)"},
                    {"id": "p2", "name": "Commit Soundtrack"},
                    {"id": "p3", "name": "Road Trip"}
                ]
            }"#,
        )
        .expect("parse playlists");
        let found = find_by_name(page.items, PLAYLIST_NAME).expect("match");
        assert_eq!(found.id, "p2");
    }

    #[test]
    fn test_find_playlist_none_on_no_match() {
        let page: PlaylistsResponse =
            serde_json::from_str(r#"{"items": []}"#).expect("parse playlists");
        assert!(find_by_name(page.items, PLAYLIST_NAME).is_none());
    }

    #[test]
    fn test_playlist_url_falls_back_to_id() {
        let with_url: ApiPlaylist = serde_json::from_str(
            r#"{"id": "p1", "name": "x", "external_urls": {"spotify": "https://example/p1"}}"#,
        )
        .expect("parse playlist");
        assert_eq!(playlist_url(&with_url), "https://example/p1");

        let without: ApiPlaylist =
            serde_json::from_str(r#"{"id": "p2", "name": "x"}"#).expect("parse playlist");
        assert_eq!(playlist_url(&without), "https://open.spotify.com/playlist/p2");
    }
}
