use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Token endpoint response for both the code exchange and the refresh grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// A bearer token together with the instant it stops being usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    /// Milliseconds since the Unix epoch.
    pub expires_at: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(access_token: String, expires_in_secs: u64, now_ms: i64) -> Self {
        Session {
            access_token,
            expires_at: now_ms.saturating_add((expires_in_secs as i64).saturating_mul(1000)),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token.filter(|t| !t.is_empty());
        self
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        !self.access_token.is_empty() && now_ms < self.expires_at
    }

    /// Milliseconds left before expiry, zero once expired.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at - now_ms).max(0)
    }
}

/// Snapshot of what the playback widget last reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub track_name: String,
    pub artist_names: Vec<String>,
    pub is_paused: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMode {
    Track,
    Off,
}

impl RepeatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::Track => "track",
            RepeatMode::Off => "off",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub cover_image_url: Option<String>,
    pub track_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artist_names: Vec<String>,
    pub album_name: String,
    pub duration_ms: u64,
    pub uri: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub tracks: u32,
    pub id: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub length: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
    #[serde(default)]
    pub tracks: Option<PlaylistTracksRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksRef {
    pub total: u32,
}

impl From<Playlist> for PlaylistSummary {
    fn from(playlist: Playlist) -> Self {
        PlaylistSummary {
            cover_image_url: playlist
                .images
                .and_then(|images| images.into_iter().next())
                .map(|image| image.url),
            track_count: playlist.tracks.map_or(0, |t| t.total),
            id: playlist.id,
            name: playlist.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Page<Track>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// `null` for local files.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub name: String,
}

impl From<Track> for TrackSummary {
    fn from(track: Track) -> Self {
        TrackSummary {
            artist_names: track.artists.into_iter().map(|a| a.name).collect(),
            album_name: track.album.map(|a| a.name).unwrap_or_default(),
            duration_ms: track.duration_ms,
            id: track.id.unwrap_or_default(),
            name: track.name,
            uri: track.uri,
        }
    }
}

/// `GET /me/player/devices`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

/// `GET /me/player`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentPlayback {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub item: Option<Track>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferPlaybackRequest {
    pub device_ids: Vec<String>,
    pub play: bool,
}

/// Error body sent by the Web API: `{"error": {"status": 404, "message": ".."}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}
