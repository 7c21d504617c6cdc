use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use reqwest::StatusCode;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

use crate::{
    error::{Error, Result, WidgetErrorKind},
    playback::{PlaybackWidget, WidgetEvent},
    spotify::{
        client::WebApi,
        player::{self, PlayerCommand},
    },
    types::Device,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Picks the device to drive: the named one, else the active one, else the
/// first one Spotify lists. Devices without an id cannot be addressed.
pub fn resolve_device(devices: Vec<Device>, preferred_name: Option<&str>) -> Option<Device> {
    let devices: Vec<Device> = devices.into_iter().filter(|d| d.id.is_some()).collect();

    if let Some(name) = preferred_name {
        if let Some(device) = devices.iter().find(|d| d.name.eq_ignore_ascii_case(name)) {
            return Some(device.clone());
        }
    }

    devices
        .iter()
        .find(|d| d.is_active)
        .or_else(|| devices.first())
        .cloned()
}

/// Lists the user's devices and resolves the one to connect to.
///
/// # Errors
///
/// Returns an initialization [`Error::Widget`] when no device is available,
/// or the underlying API error.
pub async fn load_device(api: &WebApi, token: &str, preferred_name: Option<&str>) -> Result<Device> {
    let devices = player::devices(api, token).await?;
    resolve_device(devices, preferred_name).ok_or_else(|| Error::Widget {
        kind: WidgetErrorKind::Initialization,
        message: "No Spotify Connect device available, open Spotify on one of your devices"
            .to_string(),
    })
}

/// Widget backed by a Spotify Connect device through the Web API.
///
/// State changes are polled from `GET /me/player` and pushed as events;
/// commands are spawned as independent requests. Must be used from within a
/// tokio runtime.
pub struct ConnectWidget {
    inner: Arc<Inner>,
    poller: Mutex<Option<JoinHandle<()>>>,
    disconnected: AtomicBool,
}

struct Inner {
    api: WebApi,
    token: String,
    device_id: String,
    events: UnboundedSender<WidgetEvent>,
    poll_interval: Duration,
}

impl ConnectWidget {
    pub fn new(
        api: WebApi,
        token: impl Into<String>,
        device: &Device,
        events: UnboundedSender<WidgetEvent>,
    ) -> Self {
        ConnectWidget {
            inner: Arc::new(Inner {
                api,
                token: token.into(),
                device_id: device.id.clone().unwrap_or_default(),
                events,
                poll_interval: DEFAULT_POLL_INTERVAL,
            }),
            poller: Mutex::new(None),
            disconnected: AtomicBool::new(false),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.poll_interval = poll_interval;
        }
        self
    }
}

impl Inner {
    fn emit(&self, event: WidgetEvent) -> bool {
        self.events.send(event).is_ok()
    }

    fn emit_error(&self, error: Error) -> bool {
        let event = match error {
            Error::TokenExpired => WidgetEvent::error(
                WidgetErrorKind::Authentication,
                "Spotify rejected the access token",
            ),
            Error::Upstream { status, message } if status == StatusCode::FORBIDDEN => {
                WidgetEvent::error(WidgetErrorKind::Account, message)
            }
            other => WidgetEvent::error(WidgetErrorKind::Playback, other.to_string()),
        };
        self.emit(event)
    }

    async fn poll(self: Arc<Self>) {
        if !self.emit(WidgetEvent::Ready {
            device_id: self.device_id.clone(),
        }) {
            return;
        }

        loop {
            let keep_going = match player::current_playback(&self.api, &self.token).await {
                Ok(current) => self.emit(WidgetEvent::from_current_playback(current)),
                Err(Error::TokenExpired) => {
                    self.emit_error(Error::TokenExpired);
                    false
                }
                Err(e) => self.emit_error(e),
            };
            if !keep_going {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl PlaybackWidget for ConnectWidget {
    fn connect(&self) {
        if self.disconnected.load(Ordering::SeqCst) {
            return;
        }
        let Ok(mut poller) = self.poller.lock() else {
            return;
        };
        if poller.is_none() {
            *poller = Some(tokio::spawn(Arc::clone(&self.inner).poll()));
        }
    }

    fn disconnect(&self) {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut poller) = self.poller.lock() {
            if let Some(handle) = poller.take() {
                handle.abort();
            }
        }
    }

    fn command(&self, command: PlayerCommand) {
        if self.disconnected.load(Ordering::SeqCst) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = player::send_command(
                &inner.api,
                &inner.token,
                &command,
                Some(inner.device_id.as_str()),
            )
            .await;
            if let Err(e) = result {
                inner.emit_error(e);
            }
        });
    }
}

impl Drop for ConnectWidget {
    fn drop(&mut self) {
        self.disconnect();
    }
}
