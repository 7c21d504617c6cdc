use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::WidgetErrorKind,
    types::{CurrentPlayback, PlaybackState},
};

/// Everything a playback widget can report.
///
/// Payloads are validated when the event is built; the bridge never sees a
/// half-parsed state.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    Ready { device_id: String },
    /// `None` when the widget reports a null state (nothing loaded).
    PlayerStateChanged(Option<PlaybackState>),
    InitializationError { message: String },
    AuthenticationError { message: String },
    AccountError { message: String },
    PlaybackError { message: String },
}

#[derive(Deserialize)]
struct ReadyPayload {
    device_id: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: String,
}

#[derive(Deserialize)]
struct StatePayload {
    paused: bool,
    #[serde(default)]
    position: u64,
    #[serde(default)]
    duration: u64,
    track_window: TrackWindow,
}

#[derive(Deserialize)]
struct TrackWindow {
    current_track: Option<CurrentTrack>,
}

#[derive(Deserialize)]
struct CurrentTrack {
    name: String,
    #[serde(default)]
    artists: Vec<NamedItem>,
}

#[derive(Deserialize)]
struct NamedItem {
    name: String,
}

impl WidgetEvent {
    /// Builds an event from the widget's event name and JSON payload.
    ///
    /// Returns `None` for unknown event names and for payloads that do not
    /// have the expected shape.
    pub fn from_json(name: &str, payload: &Value) -> Option<Self> {
        match name {
            "ready" => serde_json::from_value::<ReadyPayload>(payload.clone())
                .ok()
                .filter(|p| !p.device_id.is_empty())
                .map(|p| WidgetEvent::Ready {
                    device_id: p.device_id,
                }),
            "player_state_changed" => {
                if payload.is_null() {
                    return Some(WidgetEvent::PlayerStateChanged(None));
                }
                let state = serde_json::from_value::<StatePayload>(payload.clone()).ok()?;
                let playback = state.track_window.current_track.map(|track| PlaybackState {
                    track_name: track.name,
                    artist_names: track.artists.into_iter().map(|a| a.name).collect(),
                    is_paused: state.paused,
                    position_ms: state.position,
                    duration_ms: state.duration,
                });
                Some(WidgetEvent::PlayerStateChanged(playback))
            }
            "initialization_error" => {
                error_message(payload).map(|message| WidgetEvent::InitializationError { message })
            }
            "authentication_error" => {
                error_message(payload).map(|message| WidgetEvent::AuthenticationError { message })
            }
            "account_error" => {
                error_message(payload).map(|message| WidgetEvent::AccountError { message })
            }
            "playback_error" => {
                error_message(payload).map(|message| WidgetEvent::PlaybackError { message })
            }
            _ => None,
        }
    }

    pub fn error(kind: WidgetErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            WidgetErrorKind::Initialization => WidgetEvent::InitializationError { message },
            WidgetErrorKind::Authentication => WidgetEvent::AuthenticationError { message },
            WidgetErrorKind::Account => WidgetEvent::AccountError { message },
            WidgetErrorKind::Playback => WidgetEvent::PlaybackError { message },
        }
    }

    /// State event for a Web API `GET /me/player` answer.
    pub fn from_current_playback(current: Option<CurrentPlayback>) -> Self {
        let playback = current.and_then(|current| {
            let track = current.item?;
            Some(PlaybackState {
                track_name: track.name,
                artist_names: track.artists.into_iter().map(|a| a.name).collect(),
                is_paused: !current.is_playing,
                position_ms: current.progress_ms.unwrap_or(0),
                duration_ms: track.duration_ms,
            })
        });
        WidgetEvent::PlayerStateChanged(playback)
    }
}

fn error_message(payload: &Value) -> Option<String> {
    serde_json::from_value::<ErrorPayload>(payload.clone())
        .ok()
        .map(|p| p.message)
}
