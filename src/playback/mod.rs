//! # Playback Module
//!
//! Keeps local playback state in sync with a playback widget and routes
//! transport commands to it.
//!
//! ```text
//! Unconnected → Connecting → Ready → (Playing ⇄ Paused) → Disconnected
//! ```
//!
//! - [`PlaybackBridge`] is the state machine. It never performs I/O; events
//!   go in, [`BridgeNotice`]s come out.
//! - [`PlaybackWidget`] is the seam to the actual player; [`ConnectWidget`]
//!   implements it on top of the Web API player endpoints.
//! - [`WidgetEvent`] is the closed set of events a widget may report.
//! - [`apply_notices`] carries out the notices against the Web API and the
//!   token manager.

mod bridge;
mod connect;
mod event;
mod widget;

pub use bridge::BridgeNotice;
pub use bridge::BridgeState;
pub use bridge::PlaybackBridge;
pub use connect::ConnectWidget;
pub use connect::DEFAULT_POLL_INTERVAL;
pub use connect::load_device;
pub use connect::resolve_device;
pub use event::WidgetEvent;
pub use widget::PlaybackWidget;
pub use widget::WidgetLoader;

use crate::{
    error::{Error, Result},
    management::{SessionStore, TokenManager},
    spotify::{client::WebApi, player},
};

/// Performs the side effects requested by the bridge.
///
/// Widget errors are returned to the caller for display, never raised. A
/// failed playback transfer is reported the same way.
///
/// # Errors
///
/// Only a failure to clear the stored session is returned as `Err`.
pub async fn apply_notices<S: SessionStore>(
    notices: &[BridgeNotice],
    api: &WebApi,
    token: &str,
    manager: &TokenManager<S>,
) -> Result<Vec<Error>> {
    let mut surfaced = Vec::new();

    for notice in notices {
        match notice {
            BridgeNotice::TransferPlayback(device_id) => {
                if let Err(e) = player::transfer_playback(api, token, device_id, false).await {
                    if matches!(e, Error::TokenExpired) {
                        manager.clear().await?;
                    }
                    surfaced.push(e);
                }
            }
            BridgeNotice::SessionInvalidated => manager.clear().await?,
            BridgeNotice::Error { .. } => surfaced.extend(notice.as_error()),
            BridgeNotice::PlaybackChanged(_) => {}
        }
    }

    Ok(surfaced)
}
