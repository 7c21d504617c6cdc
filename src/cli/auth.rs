use std::time::Duration;

use reqwest::Client;

use crate::{
    config::Config,
    error::{Error, Result},
    info,
    management::{SessionStore, TokenManager, now_ms},
    spotify, success,
    types::Session,
    utils, warning,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

pub async fn login(config: &Config) {
    let manager = TokenManager::on_disk();
    match spotify::auth::login(config, &manager, LOGIN_TIMEOUT).await {
        Ok(session) => info!(
            "Session valid for {}",
            utils::format_duration(session.remaining_ms(now_ms()) as u64)
        ),
        Err(e) => warning!("{}", e),
    }
}

pub async fn logout() {
    match TokenManager::on_disk().clear().await {
        Ok(()) => success!("Logged out."),
        Err(e) => warning!("Failed to remove session: {}", e),
    }
}

pub async fn status(config: &Config) {
    match active_session(config).await {
        Ok(Some(session)) => success!(
            "Logged in, session valid for {}",
            utils::format_duration(session.remaining_ms(now_ms()) as u64)
        ),
        Ok(None) => info!("Not logged in. Run spotbridge login."),
        Err(e) => warning!("{}", e),
    }
}

/// Restores the stored session, refreshing it first when it has expired and
/// a refresh token is available.
pub async fn active_session(config: &Config) -> Result<Option<Session>> {
    spotify::auth::restore_or_refresh(&Client::new(), config, &TokenManager::on_disk()).await
}

/// Session or a hint to log in. Used by every command that talks to the API.
pub async fn require_session(config: &Config) -> Option<Session> {
    match active_session(config).await {
        Ok(Some(session)) => Some(session),
        Ok(None) => {
            warning!("Not logged in. Run spotbridge login first.");
            None
        }
        Err(e) => {
            warning!("{}", e);
            None
        }
    }
}

/// Reports an API error; a 401 also drops the stored session.
pub async fn report_api_error<S: SessionStore>(manager: &TokenManager<S>, error: Error) {
    if error.is_session_fatal() {
        if let Err(e) = manager.clear().await {
            warning!("Failed to remove session: {}", e);
        }
    }
    warning!("{}", error);
}
