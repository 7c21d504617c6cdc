use reqwest::Method;

use crate::{
    error::Result,
    spotify::client::WebApi,
    types::{CurrentPlayback, Device, DevicesResponse, RepeatMode, TransferPlaybackRequest},
};

/// Moves playback to `device_id` (`PUT /me/player`).
pub async fn transfer_playback(api: &WebApi, token: &str, device_id: &str, play: bool) -> Result<()> {
    let body = TransferPlaybackRequest {
        device_ids: vec![device_id.to_string()],
        play,
    };
    api.send_empty(Method::PUT, token, "/me/player", &[], Some(&body))
        .await
}

pub async fn devices(api: &WebApi, token: &str) -> Result<Vec<Device>> {
    let response: DevicesResponse = api.get_json(token, "/me/player/devices", &[]).await?;
    Ok(response.devices)
}

/// Current playback, `None` when nothing is active.
pub async fn current_playback(api: &WebApi, token: &str) -> Result<Option<CurrentPlayback>> {
    api.get_optional_json(token, "/me/player").await
}

/// A transport command as sent to the Web API.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Resume,
    Pause,
    Next,
    Previous,
    Seek(u64),
    /// 0.0 to 1.0
    Volume(f32),
    Shuffle(bool),
    Repeat(RepeatMode),
}

impl PlayerCommand {
    fn method(&self) -> Method {
        match self {
            PlayerCommand::Next | PlayerCommand::Previous => Method::POST,
            _ => Method::PUT,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            PlayerCommand::Resume => "/me/player/play",
            PlayerCommand::Pause => "/me/player/pause",
            PlayerCommand::Next => "/me/player/next",
            PlayerCommand::Previous => "/me/player/previous",
            PlayerCommand::Seek(_) => "/me/player/seek",
            PlayerCommand::Volume(_) => "/me/player/volume",
            PlayerCommand::Shuffle(_) => "/me/player/shuffle",
            PlayerCommand::Repeat(_) => "/me/player/repeat",
        }
    }

    fn query(&self, device_id: Option<&str>) -> Vec<(&'static str, String)> {
        let mut query = match self {
            PlayerCommand::Seek(ms) => vec![("position_ms", ms.to_string())],
            PlayerCommand::Volume(volume) => {
                let percent = (volume.clamp(0.0, 1.0) * 100.0).round() as u8;
                vec![("volume_percent", percent.to_string())]
            }
            PlayerCommand::Shuffle(on) => vec![("state", on.to_string())],
            PlayerCommand::Repeat(mode) => vec![("state", mode.as_str().to_string())],
            _ => Vec::new(),
        };
        if let Some(device_id) = device_id {
            query.push(("device_id", device_id.to_string()));
        }
        query
    }
}

/// Sends one transport command, optionally targeting a device.
pub async fn send_command(
    api: &WebApi,
    token: &str,
    command: &PlayerCommand,
    device_id: Option<&str>,
) -> Result<()> {
    api.send_empty(
        command.method(),
        token,
        command.path(),
        &command.query(device_id),
        None::<&()>,
    )
    .await
}
