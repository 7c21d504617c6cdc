use std::time::Duration;

use tokio::{
    sync::mpsc::{UnboundedReceiver, unbounded_channel},
    time::{Instant, sleep_until},
};

use crate::{
    cli::auth::{report_api_error, require_session},
    config::Config,
    error::Error,
    info,
    management::{FileSessionStore, TokenManager, now_ms},
    playback::{
        BridgeNotice, ConnectWidget, PlaybackBridge, WidgetEvent, WidgetLoader, apply_notices,
        load_device,
    },
    spotify::client::WebApi,
    success,
    types::{Device, PlaybackState, RepeatMode},
    utils, warning,
};

/// How long a one-shot command waits for the device to report in.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// How long a one-shot command keeps listening after sending.
const SETTLE_TIME: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAction {
    Watch,
    Toggle,
    Next,
    Previous,
    Seek(u64),
    Volume(f32),
    Shuffle(bool),
    Repeat(RepeatMode),
}

pub async fn player(config: &Config, action: PlayerAction) {
    let Some(session) = require_session(config).await else {
        return;
    };
    let manager = TokenManager::on_disk();
    let api = WebApi::from_config(config);
    let token = session.access_token.clone();

    let loader: WidgetLoader<Device> = WidgetLoader::new();
    let device = match loader
        .load(|| load_device(&api, &token, config.device_name.as_deref()))
        .await
    {
        Ok(device) => device,
        Err(e) => return report_api_error(&manager, e).await,
    };
    info!("Using device {}", device.name);

    let (tx, mut rx) = unbounded_channel();
    let widget = ConnectWidget::new(api.clone(), token.clone(), device, tx);

    let mut bridge = PlaybackBridge::new();
    if !bridge.connect(Some(&session), now_ms(), Some(widget)) {
        warning!("Session expired. Run spotbridge login.");
        return;
    }

    let mut pump = Pump {
        bridge: &mut bridge,
        rx: &mut rx,
        api: &api,
        token: &token,
        manager: &manager,
    };

    if action == PlayerAction::Watch {
        pump.watch().await;
    } else if pump.wait_for_state(Instant::now() + CONNECT_TIMEOUT).await {
        run_action(pump.bridge, &action);
        pump.run_until(Instant::now() + SETTLE_TIME).await;
    } else {
        warning!("Device did not respond in time.");
    }

    bridge.disconnect();
}

fn run_action(bridge: &PlaybackBridge<ConnectWidget>, action: &PlayerAction) {
    match action {
        PlayerAction::Watch => {}
        PlayerAction::Toggle => bridge.toggle_play(),
        PlayerAction::Next => bridge.next(),
        PlayerAction::Previous => bridge.previous(),
        PlayerAction::Seek(ms) => bridge.seek(*ms),
        PlayerAction::Volume(volume) => bridge.set_volume(*volume),
        PlayerAction::Shuffle(on) => bridge.set_shuffle(*on),
        PlayerAction::Repeat(mode) => bridge.set_repeat(*mode),
    }
}

struct Pump<'a> {
    bridge: &'a mut PlaybackBridge<ConnectWidget>,
    rx: &'a mut UnboundedReceiver<WidgetEvent>,
    api: &'a WebApi,
    token: &'a str,
    manager: &'a TokenManager<FileSessionStore>,
}

/// What the pump saw in one event.
enum Step {
    Continue,
    State,
    Stop,
}

impl Pump<'_> {
    async fn step(&mut self, event: WidgetEvent) -> Step {
        let is_state = matches!(event, WidgetEvent::PlayerStateChanged(_));
        let notices = self.bridge.handle_event(event);

        let mut stop = false;
        for notice in &notices {
            match notice {
                BridgeNotice::PlaybackChanged(state) => print_state(state),
                BridgeNotice::TransferPlayback(_) => {
                    success!("Connected to device");
                }
                BridgeNotice::SessionInvalidated => {
                    warning!("Session is no longer valid. Run spotbridge login.");
                    stop = true;
                }
                BridgeNotice::Error { .. } => {}
            }
        }

        match apply_notices(&notices, self.api, self.token, self.manager).await {
            Ok(errors) => {
                for error in errors {
                    if matches!(error, Error::TokenExpired) {
                        stop = true;
                    }
                    warning!("{}", error);
                }
            }
            Err(e) => warning!("{}", e),
        }

        if stop {
            Step::Stop
        } else if is_state {
            Step::State
        } else {
            Step::Continue
        }
    }

    /// Pumps until the first state report; false on timeout or stop.
    async fn wait_for_state(&mut self, deadline: Instant) -> bool {
        loop {
            tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => match self.step(event).await {
                        Step::State => return true,
                        Step::Stop => return false,
                        Step::Continue => {}
                    },
                    None => return false,
                },
                _ = sleep_until(deadline) => return false,
            }
        }
    }

    async fn run_until(&mut self, deadline: Instant) {
        loop {
            tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => {
                        if let Step::Stop = self.step(event).await {
                            return;
                        }
                    }
                    None => return,
                },
                _ = sleep_until(deadline) => return,
            }
        }
    }

    async fn watch(&mut self) {
        info!("Watching playback, press Ctrl-C to stop");
        let mut last: Option<PlaybackState> = None;
        loop {
            tokio::select! {
                event = self.rx.recv() => match event {
                    // only print when something changed
                    Some(WidgetEvent::PlayerStateChanged(Some(state))) if last.as_ref() == Some(&state) => {}
                    Some(event) => {
                        if let WidgetEvent::PlayerStateChanged(Some(state)) = &event {
                            last = Some(state.clone());
                        }
                        if let Step::Stop = self.step(event).await {
                            return;
                        }
                    }
                    None => return,
                },
                _ = tokio::signal::ctrl_c() => return,
            }
        }
    }
}

fn print_state(state: &PlaybackState) {
    let marker = if state.is_paused { "paused" } else { "playing" };
    info!(
        "[{}] {} - {} ({} / {})",
        marker,
        state.track_name,
        utils::join_artists(&state.artist_names),
        utils::format_duration(state.position_ms),
        utils::format_duration(state.duration_ms)
    );
}
