use tabled::Table;

use crate::{
    cli::auth::{report_api_error, require_session},
    config::Config,
    info,
    management::TokenManager,
    spotify::{client::WebApi, playlists},
    utils,
};

pub async fn list_playlists(config: &Config, search: Option<String>, limit: u32, offset: u32) {
    let Some(session) = require_session(config).await else {
        return;
    };

    let api = WebApi::from_config(config);
    let all = match playlists::list(&api, &session.access_token, limit, offset).await {
        Ok(all) => all,
        Err(e) => return report_api_error(&TokenManager::on_disk(), e).await,
    };

    let query = search.unwrap_or_default();
    let shown = playlists::filter_playlists(&all, &query);
    if shown.is_empty() {
        if query.trim().is_empty() {
            info!("No playlists found.");
        } else {
            info!("No playlists found for \"{}\"", query);
        }
        return;
    }

    println!("{}", Table::new(utils::playlist_rows(&shown)));
}

pub async fn search_tracks(config: &Config, query: String) {
    let Some(session) = require_session(config).await else {
        return;
    };

    let api = WebApi::from_config(config);
    match playlists::search(&api, &session.access_token, &query).await {
        Ok(tracks) if tracks.is_empty() => info!("No tracks found for \"{}\"", query),
        Ok(tracks) => println!("{}", Table::new(utils::track_rows(&tracks))),
        Err(e) => report_api_error(&TokenManager::on_disk(), e).await,
    }
}
