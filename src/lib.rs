//! Spotify Login Relay and Playback Bridge
//!
//! This library provides the pieces needed to log a user into Spotify, keep the
//! resulting session on disk, browse the user's playlists and drive playback on
//! a Spotify Connect device. It also ships the small OAuth backend relay that
//! performs the authorization-code exchange on behalf of a front-end.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the OAuth relay
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error kinds shared by every layer
//! - `management` - Session persistence and the token manager
//! - `playback` - Playback bridge state machine and widget events
//! - `server` - Router assembly and the relay server loop
//! - `spotify` - Spotify accounts and Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotbridge::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> spotbridge::error::Result<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     server::start_api_server(config).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod playback;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Informational console line, prefixed with a blue `o`.
///
/// Takes the same arguments as `println!`.
///
/// ```
/// let count = 12;
/// info!("Found {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Console line for a completed step, prefixed with a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits with status 1.
///
/// Only for failures the process cannot continue from, such as a missing
/// `SPOTIFY_CLIENT_ID` at startup. Everything after the call is unreachable.
///
/// ```
/// error!("SPOTIFY_CLIENT_ID must be set");
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Recoverable problem, prefixed with a yellow `!`. Rate limits, failed
/// requests and rejected sessions are reported through this one.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
