use axum::{Extension, extract::RawQuery, response::Html};

use crate::server::LandingSlot;

/// Front-end stand-in for the CLI login: keeps the query the relay
/// redirected with so the waiting login can pick it up.
pub async fn landing(
    RawQuery(query): RawQuery,
    Extension(slot): Extension<LandingSlot>,
) -> Html<&'static str> {
    let query = query.unwrap_or_default();
    let failed = query.split('&').any(|pair| pair.starts_with("error="));

    let mut lock = slot.lock().await;
    if lock.is_none() {
        *lock = Some(query);
    }

    if failed {
        Html("<h4>Login failed.</h4><p>Check the terminal for details.</p>")
    } else {
        Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
    }
}
