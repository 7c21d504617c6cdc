mod common;

use common::RecordingWidget;
use spotbridge::{
    error::{Error, WidgetErrorKind},
    playback::{BridgeNotice, BridgeState, PlaybackBridge, WidgetEvent},
    types::{PlaybackState, RepeatMode, Session},
};

const NOW: i64 = 1_700_000_000_000;

fn session() -> Session {
    Session::new("token".to_string(), 3600, NOW)
}

fn state(track: &str, paused: bool) -> PlaybackState {
    PlaybackState {
        track_name: track.to_string(),
        artist_names: vec!["Artist".to_string()],
        is_paused: paused,
        position_ms: 1000,
        duration_ms: 200_000,
    }
}

/// Bridge that already went through connect and `ready`.
fn ready_bridge() -> (PlaybackBridge<RecordingWidget>, RecordingWidget) {
    let widget = RecordingWidget::default();
    let mut bridge = PlaybackBridge::new();
    assert!(bridge.connect(Some(&session()), NOW, Some(widget.clone())));
    bridge.handle_event(WidgetEvent::Ready {
        device_id: "device-1".to_string(),
    });
    (bridge, widget)
}

#[test]
fn test_connect_requires_valid_session() {
    let widget = RecordingWidget::default();
    let mut bridge = PlaybackBridge::new();

    assert!(!bridge.connect(None, NOW, Some(widget.clone())));
    let expired = Session::new("token".to_string(), 1, NOW);
    assert!(!bridge.connect(Some(&expired), NOW + 1000, Some(widget.clone())));

    assert_eq!(bridge.state(), BridgeState::Unconnected);
    assert!(widget.calls().is_empty());
}

#[test]
fn test_connect_waits_for_loaded_widget() {
    let mut bridge: PlaybackBridge<RecordingWidget> = PlaybackBridge::new();

    assert!(!bridge.connect(Some(&session()), NOW, None));
    assert_eq!(bridge.state(), BridgeState::Unconnected);
}

#[test]
fn test_connect_only_once() {
    let widget = RecordingWidget::default();
    let mut bridge = PlaybackBridge::new();

    assert!(bridge.connect(Some(&session()), NOW, Some(widget.clone())));
    assert_eq!(bridge.state(), BridgeState::Connecting);
    assert!(!bridge.connect(Some(&session()), NOW, Some(widget.clone())));

    assert_eq!(widget.calls(), vec!["connect"]);
}

#[test]
fn test_ready_requests_transfer() {
    let widget = RecordingWidget::default();
    let mut bridge = PlaybackBridge::new();
    bridge.connect(Some(&session()), NOW, Some(widget));

    let notices = bridge.handle_event(WidgetEvent::Ready {
        device_id: "device-1".to_string(),
    });

    assert_eq!(
        notices,
        vec![BridgeNotice::TransferPlayback("device-1".to_string())]
    );
    assert_eq!(bridge.state(), BridgeState::Ready);
    assert_eq!(bridge.device_id(), Some("device-1"));
}

#[test]
fn test_events_before_connect_are_ignored() {
    let mut bridge: PlaybackBridge<RecordingWidget> = PlaybackBridge::new();

    let notices = bridge.handle_event(WidgetEvent::PlayerStateChanged(Some(state("A", false))));

    assert!(notices.is_empty());
    assert!(bridge.playback().is_none());
    assert_eq!(bridge.state(), BridgeState::Unconnected);
}

#[test]
fn test_state_changes_follow_widget() {
    let (mut bridge, _widget) = ready_bridge();

    let notices = bridge.handle_event(WidgetEvent::PlayerStateChanged(Some(state("A", false))));
    assert_eq!(notices, vec![BridgeNotice::PlaybackChanged(state("A", false))]);
    assert_eq!(bridge.state(), BridgeState::Playing);

    bridge.handle_event(WidgetEvent::PlayerStateChanged(Some(state("A", true))));
    assert_eq!(bridge.state(), BridgeState::Paused);
    assert_eq!(bridge.playback(), Some(&state("A", true)));

    bridge.handle_event(WidgetEvent::PlayerStateChanged(Some(state("B", false))));
    assert_eq!(bridge.state(), BridgeState::Playing);
    assert_eq!(bridge.playback().map(|p| p.track_name.as_str()), Some("B"));
}

#[test]
fn test_null_state_keeps_previous_state() {
    let (mut bridge, _widget) = ready_bridge();
    bridge.handle_event(WidgetEvent::PlayerStateChanged(Some(state("A", false))));

    let notices = bridge.handle_event(WidgetEvent::PlayerStateChanged(None));

    assert!(notices.is_empty());
    assert_eq!(bridge.state(), BridgeState::Playing);
    assert_eq!(bridge.playback(), Some(&state("A", false)));
}

#[test]
fn test_commands_before_ready_are_dropped() {
    let widget = RecordingWidget::default();
    let mut bridge = PlaybackBridge::new();
    bridge.toggle_play();
    bridge.connect(Some(&session()), NOW, Some(widget.clone()));

    bridge.toggle_play();
    bridge.next();
    bridge.seek(5000);

    assert_eq!(widget.calls(), vec!["connect"]);
}

#[test]
fn test_toggle_play_depends_on_reported_state() {
    let (mut bridge, widget) = ready_bridge();

    // nothing reported yet
    bridge.toggle_play();

    bridge.handle_event(WidgetEvent::PlayerStateChanged(Some(state("A", false))));
    bridge.toggle_play();

    bridge.handle_event(WidgetEvent::PlayerStateChanged(Some(state("A", true))));
    bridge.toggle_play();

    assert_eq!(widget.calls(), vec!["connect", "Resume", "Pause", "Resume"]);
}

#[test]
fn test_commands_reach_widget() {
    let (bridge, widget) = ready_bridge();

    bridge.next();
    bridge.previous();
    bridge.seek(42_000);
    bridge.set_shuffle(true);
    bridge.set_repeat(RepeatMode::Track);

    assert_eq!(
        widget.calls(),
        vec![
            "connect",
            "Next",
            "Previous",
            "Seek(42000)",
            "Shuffle(true)",
            "Repeat(Track)"
        ]
    );
}

#[test]
fn test_volume_is_clamped() {
    let (bridge, widget) = ready_bridge();

    bridge.set_volume(1.7);
    bridge.set_volume(-0.5);
    bridge.set_volume(f32::NAN);
    bridge.set_volume(0.25);

    assert_eq!(
        widget.calls()[1..],
        ["Volume(1.0)", "Volume(0.0)", "Volume(0.0)", "Volume(0.25)"]
    );
}

#[test]
fn test_authentication_error_invalidates_session() {
    let (mut bridge, _widget) = ready_bridge();

    let notices = bridge.handle_event(WidgetEvent::AuthenticationError {
        message: "Invalid token scopes.".to_string(),
    });

    assert_eq!(
        notices,
        vec![
            BridgeNotice::Error {
                kind: WidgetErrorKind::Authentication,
                message: "Invalid token scopes.".to_string(),
            },
            BridgeNotice::SessionInvalidated,
        ]
    );
    assert!(matches!(
        notices[0].as_error(),
        Some(Error::Widget {
            kind: WidgetErrorKind::Authentication,
            ..
        })
    ));
    assert!(notices[1].as_error().is_none());
}

#[test]
fn test_other_errors_are_only_reported() {
    let (mut bridge, _widget) = ready_bridge();

    for (event, kind) in [
        (
            WidgetEvent::AccountError {
                message: "premium required".to_string(),
            },
            WidgetErrorKind::Account,
        ),
        (
            WidgetEvent::PlaybackError {
                message: "stream failed".to_string(),
            },
            WidgetErrorKind::Playback,
        ),
        (
            WidgetEvent::InitializationError {
                message: "unsupported".to_string(),
            },
            WidgetErrorKind::Initialization,
        ),
    ] {
        let notices = bridge.handle_event(event);
        assert_eq!(notices.len(), 1);
        assert!(matches!(&notices[0], BridgeNotice::Error { kind: k, .. } if *k == kind));
    }
    assert_eq!(bridge.state(), BridgeState::Ready);
}

#[test]
fn test_disconnect_is_idempotent() {
    let (mut bridge, widget) = ready_bridge();

    bridge.disconnect();
    bridge.disconnect();
    bridge.next();

    assert_eq!(bridge.state(), BridgeState::Disconnected);
    assert_eq!(widget.calls(), vec!["connect", "disconnect"]);
    assert!(
        bridge
            .handle_event(WidgetEvent::PlayerStateChanged(Some(state("A", false))))
            .is_empty()
    );
}

#[test]
fn test_drop_disconnects() {
    let (bridge, widget) = ready_bridge();

    drop(bridge);

    assert_eq!(widget.calls(), vec!["connect", "disconnect"]);
}
