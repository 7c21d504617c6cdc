//! # Spotify Integration Module
//!
//! Accounts service and Web API access used by the relay, the CLI and the
//! Connect widget.
//!
//! ```text
//! CLI / Relay / Playback bridge
//!          ↓
//! Spotify Integration Layer
//!     ├── auth       (authorize URL, code exchange, refresh, browser login)
//!     ├── client     (bearer requests, 429 retry, error mapping)
//!     ├── playlists  (list, search, local filtering)
//!     └── player     (transfer playback, transport commands)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Error Handling
//!
//! - 429 Too Many Requests is retried up to three times with exponential
//!   backoff; a `Retry-After` header within the cap takes precedence over
//!   the computed delay
//! - 401 Unauthorized becomes [`crate::error::Error::TokenExpired`]; the
//!   caller clears the session
//! - any other non-2xx becomes [`crate::error::Error::Upstream`] carrying the
//!   message from Spotify's error body when there is one
//!
//! ## API Coverage
//!
//! - `GET /me/playlists`
//! - `GET /search?type=track`
//! - `PUT /me/player`, `GET /me/player`, `GET /me/player/devices`
//! - `PUT /me/player/{play,pause,seek,volume,shuffle,repeat}`
//! - `POST /me/player/{next,previous}`
//! - `POST /api/token` on the accounts service

pub mod auth;
pub mod client;
pub mod player;
pub mod playlists;
