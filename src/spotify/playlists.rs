use crate::{
    error::Result,
    spotify::client::WebApi,
    types::{Page, Playlist, PlaylistSummary, SearchResponse, TrackSummary},
};

pub const DEFAULT_LIMIT: u32 = 20;

/// Lists the current user's playlists (`GET /me/playlists`).
///
/// 429 answers are retried according to the client's [`RetryPolicy`];
/// other failures surface as typed errors with Spotify's message.
///
/// [`RetryPolicy`]: crate::spotify::client::RetryPolicy
pub async fn list(
    api: &WebApi,
    token: &str,
    limit: u32,
    offset: u32,
) -> Result<Vec<PlaylistSummary>> {
    let page: Page<Playlist> = api
        .get_json(
            token,
            "/me/playlists",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await?;

    Ok(page.items.into_iter().map(PlaylistSummary::from).collect())
}

/// Searches tracks (`GET /search?type=track`).
pub async fn search(api: &WebApi, token: &str, query: &str) -> Result<Vec<TrackSummary>> {
    let response: SearchResponse = api
        .get_json(
            token,
            "/search",
            &[("q", query.to_string()), ("type", "track".to_string())],
        )
        .await?;

    Ok(response
        .tracks
        .map(|page| page.items.into_iter().map(TrackSummary::from).collect())
        .unwrap_or_default())
}

/// Case-insensitive substring filter over playlist names.
///
/// Returns a new vector and leaves `playlists` untouched; a blank query
/// returns every playlist.
pub fn filter_playlists(playlists: &[PlaylistSummary], query: &str) -> Vec<PlaylistSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return playlists.to_vec();
    }

    playlists
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
