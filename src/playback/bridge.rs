use crate::{
    error::{Error, WidgetErrorKind},
    playback::{PlaybackWidget, WidgetEvent},
    spotify::player::PlayerCommand,
    types::{PlaybackState, RepeatMode, Session},
};

/// Lifecycle of the widget as seen by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Unconnected,
    Connecting,
    Ready,
    Playing,
    Paused,
    Disconnected,
}

/// Something the owner of the bridge has to act on after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeNotice {
    /// Transfer playback to this device (`PUT /me/player`).
    TransferPlayback(String),
    PlaybackChanged(PlaybackState),
    Error {
        kind: WidgetErrorKind,
        message: String,
    },
    /// The widget reported a dead token; clear the session.
    SessionInvalidated,
}

impl BridgeNotice {
    pub fn as_error(&self) -> Option<Error> {
        match self {
            BridgeNotice::Error { kind, message } => Some(Error::Widget {
                kind: *kind,
                message: message.clone(),
            }),
            _ => None,
        }
    }
}

/// Keeps local playback state in step with a [`PlaybackWidget`].
///
/// There is a single owner: events and commands go through `&mut self`, and
/// each event replaces the playback state as a whole, so the last event
/// always wins over a command issued just before it.
pub struct PlaybackBridge<W: PlaybackWidget> {
    widget: Option<W>,
    state: BridgeState,
    playback: Option<PlaybackState>,
    device_id: Option<String>,
}

impl<W: PlaybackWidget> Default for PlaybackBridge<W> {
    fn default() -> Self {
        PlaybackBridge {
            widget: None,
            state: BridgeState::Unconnected,
            playback: None,
            device_id: None,
        }
    }
}

impl<W: PlaybackWidget> PlaybackBridge<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn playback(&self) -> Option<&PlaybackState> {
        self.playback.as_ref()
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// Whether transport commands reach the widget.
    pub fn is_connected(&self) -> bool {
        matches!(
            self.state,
            BridgeState::Ready | BridgeState::Playing | BridgeState::Paused
        )
    }

    /// Starts connecting `widget` if the session is valid at `now_ms`.
    ///
    /// `widget` is `None` while its loader has not finished. Returns whether
    /// the bridge moved to [`BridgeState::Connecting`].
    pub fn connect(&mut self, session: Option<&Session>, now_ms: i64, widget: Option<W>) -> bool {
        if self.state != BridgeState::Unconnected {
            return false;
        }
        if !session.is_some_and(|s| s.is_valid_at(now_ms)) {
            return false;
        }
        let Some(widget) = widget else {
            return false;
        };

        widget.connect();
        self.widget = Some(widget);
        self.state = BridgeState::Connecting;
        true
    }

    /// Applies one widget event and tells the caller what else must happen.
    pub fn handle_event(&mut self, event: WidgetEvent) -> Vec<BridgeNotice> {
        if matches!(
            self.state,
            BridgeState::Unconnected | BridgeState::Disconnected
        ) {
            return Vec::new();
        }

        match event {
            WidgetEvent::Ready { device_id } => {
                self.device_id = Some(device_id.clone());
                self.state = BridgeState::Ready;
                vec![BridgeNotice::TransferPlayback(device_id)]
            }
            WidgetEvent::PlayerStateChanged(None) => Vec::new(),
            WidgetEvent::PlayerStateChanged(Some(playback)) => {
                self.state = if playback.is_paused {
                    BridgeState::Paused
                } else {
                    BridgeState::Playing
                };
                self.playback = Some(playback.clone());
                vec![BridgeNotice::PlaybackChanged(playback)]
            }
            WidgetEvent::InitializationError { message } => {
                vec![error_notice(WidgetErrorKind::Initialization, message)]
            }
            WidgetEvent::AuthenticationError { message } => vec![
                error_notice(WidgetErrorKind::Authentication, message),
                BridgeNotice::SessionInvalidated,
            ],
            WidgetEvent::AccountError { message } => {
                vec![error_notice(WidgetErrorKind::Account, message)]
            }
            WidgetEvent::PlaybackError { message } => {
                vec![error_notice(WidgetErrorKind::Playback, message)]
            }
        }
    }

    fn send(&self, command: PlayerCommand) {
        if !self.is_connected() {
            return;
        }
        if let Some(widget) = &self.widget {
            widget.command(command);
        }
    }

    /// Resumes unless the widget last reported playing.
    pub fn toggle_play(&self) {
        let command = match self.state {
            BridgeState::Playing => PlayerCommand::Pause,
            _ => PlayerCommand::Resume,
        };
        self.send(command);
    }

    pub fn next(&self) {
        self.send(PlayerCommand::Next);
    }

    pub fn previous(&self) {
        self.send(PlayerCommand::Previous);
    }

    pub fn seek(&self, position_ms: u64) {
        self.send(PlayerCommand::Seek(position_ms));
    }

    /// `volume` is clamped to `0.0..=1.0`.
    pub fn set_volume(&self, volume: f32) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.send(PlayerCommand::Volume(volume));
    }

    pub fn set_shuffle(&self, on: bool) {
        self.send(PlayerCommand::Shuffle(on));
    }

    pub fn set_repeat(&self, mode: RepeatMode) {
        self.send(PlayerCommand::Repeat(mode));
    }

    /// Disconnects the widget. Only the first call reaches the widget.
    pub fn disconnect(&mut self) {
        if let Some(widget) = self.widget.take() {
            widget.disconnect();
            self.state = BridgeState::Disconnected;
        }
    }
}

impl<W: PlaybackWidget> Drop for PlaybackBridge<W> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn error_notice(kind: WidgetErrorKind, message: String) -> BridgeNotice {
    BridgeNotice::Error { kind, message }
}
