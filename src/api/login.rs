use std::sync::Arc;

use axum::{
    Extension,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    info,
    server::RelayState,
    spotify::auth::{GrantType, authorize_url, generate_state},
    warning,
};

pub async fn login(Extension(relay): Extension<Arc<RelayState>>) -> Response {
    let state = generate_state();

    match authorize_url(&relay.config, GrantType::AuthorizationCode, Some(&state)) {
        Ok(url) => {
            relay.remember_state(state).await;
            info!("Redirecting to Spotify authorization");
            Redirect::to(url.as_str()).into_response()
        }
        Err(e) => {
            warning!("Cannot build authorization URL: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Relay is misconfigured").into_response()
        }
    }
}
