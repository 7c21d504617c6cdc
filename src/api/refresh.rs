use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, http::StatusCode, response::Json};
use serde_json::{Value, json};

use crate::{server::RelayState, spotify::auth, warning};

/// Trades a refresh token for a new access token.
pub async fn refresh_token(
    Query(params): Query<HashMap<String, String>>,
    Extension(relay): Extension<Arc<RelayState>>,
) -> (StatusCode, Json<Value>) {
    let Some(refresh) = params.get("refresh_token").filter(|t| !t.is_empty()) else {
        return invalid_token();
    };

    match auth::refresh_token(&relay.http, &relay.config, refresh).await {
        Ok(token) => {
            let mut body = json!({
                "access_token": token.access_token,
                "expires_in": token.expires_in,
            });
            if let Some(rotated) = token.refresh_token {
                body["refresh_token"] = Value::String(rotated);
            }
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            warning!("Token refresh failed: {}", e);
            invalid_token()
        }
    }
}

fn invalid_token() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "invalid_token" })),
    )
}
