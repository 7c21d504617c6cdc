use rand::{Rng, distr::Alphanumeric};

use crate::types::{PlaylistSummary, PlaylistTableRow, TrackSummary, TrackTableRow};

pub fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// `m:ss` rendering of a millisecond duration, `h:mm:ss` past one hour.
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

pub fn join_artists(names: &[String]) -> String {
    names.join(", ")
}

pub fn playlist_rows(playlists: &[PlaylistSummary]) -> Vec<PlaylistTableRow> {
    playlists
        .iter()
        .map(|p| PlaylistTableRow {
            name: p.name.clone(),
            tracks: p.track_count,
            id: p.id.clone(),
        })
        .collect()
}

pub fn track_rows(tracks: &[TrackSummary]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .map(|t| TrackTableRow {
            name: t.name.clone(),
            artists: join_artists(&t.artist_names),
            album: t.album_name.clone(),
            length: format_duration(t.duration_ms),
        })
        .collect()
}

/// Parses `on`/`off` style switches used by the player subcommands.
pub fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{}'", other)),
    }
}
