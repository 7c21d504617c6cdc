#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::Router;
use spotbridge::{
    config::Config,
    playback::PlaybackWidget,
    spotify::player::PlayerCommand,
};

/// Serves `app` on an ephemeral local port and returns its address.
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn test_config(accounts: &str, api: &str) -> Config {
    Config {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        redirect_uri: "http://127.0.0.1:6000/callback".to_string(),
        frontend_uri: "http://localhost:5173/home".to_string(),
        host: "127.0.0.1".to_string(),
        port: 6000,
        scope: "user-read-private user-read-email".to_string(),
        auth_url: format!("{}/authorize", accounts),
        token_url: format!("{}/api/token", accounts),
        api_url: api.to_string(),
        device_name: None,
    }
}

/// Widget that records every call instead of playing anything.
#[derive(Clone, Default)]
pub struct RecordingWidget {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingWidget {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PlaybackWidget for RecordingWidget {
    fn connect(&self) {
        self.record("connect".to_string());
    }

    fn disconnect(&self) {
        self.record("disconnect".to_string());
    }

    fn command(&self, command: PlayerCommand) {
        self.record(format!("{:?}", command));
    }
}
