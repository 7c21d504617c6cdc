//! Configuration management for spotbridge.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Credentials are never compiled into the binary;
//! they are read at runtime so the same build can serve any registered Spotify
//! application.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf};

use crate::error::{Error, Result};

/// Default accounts authorization endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
/// Default accounts token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Default Web API base URL.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
/// Scopes needed for playlists and Connect playback control.
pub const DEFAULT_SCOPE: &str = "user-read-private user-read-email user-read-playback-state user-modify-playback-state streaming playlist-read-private playlist-read-collaborative";
pub const DEFAULT_PORT: u16 = 6000;
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from `spotbridge/.env` under the platform-specific
/// local data directory:
/// - Linux: `~/.local/share/spotbridge/.env`
/// - macOS: `~/Library/Application Support/spotbridge/.env`
/// - Windows: `%LOCALAPPDATA%/spotbridge/.env`
///
/// A missing `.env` file is not an error; the process environment is used
/// as is in that case.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the `.env` file
/// exists but cannot be parsed.
pub async fn load_env() -> Result<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))
}

/// Root of everything spotbridge keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotbridge");
    path
}

/// Runtime configuration of the relay, the Web API client and the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub frontend_uri: String,
    pub host: String,
    pub port: u16,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    /// Preferred Connect device; the active or first device is used otherwise.
    pub device_name: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Required variables are `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`,
    /// `SPOTIFY_REDIRECT_URI` and `FRONTEND_URI`. `PORT` defaults to 6000,
    /// `SERVER_HOST` to 127.0.0.1, and the Spotify endpoints to the public
    /// ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a required variable is missing or
    /// `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("PORT is not a valid port: {}", e)))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Config {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_REDIRECT_URI")?,
            frontend_uri: required("FRONTEND_URI")?,
            host: optional("SERVER_HOST", DEFAULT_HOST),
            port,
            scope: optional("SPOTIFY_SCOPE", DEFAULT_SCOPE),
            auth_url: optional("SPOTIFY_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: optional("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: optional("SPOTIFY_API_URL", DEFAULT_API_URL),
            device_name: env::var("SPOTIFY_DEVICE_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty()),
        })
    }

    /// Address the relay binds to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `SERVER_HOST` is not an IP address.
    pub fn server_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("Failed to parse server address: {}", e)))
    }

    /// Scopes as individual entries. Accepts space, `%20` or comma separators.
    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .replace("%20", " ")
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{} must be set", name))),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
