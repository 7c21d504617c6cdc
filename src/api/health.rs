use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::server::RelayState;

pub async fn health(Extension(relay): Extension<Arc<RelayState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "redirect_uri": relay.config.redirect_uri,
    }))
}
