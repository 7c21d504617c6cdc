//! # API Module
//!
//! HTTP endpoints of the OAuth relay. The relay keeps the client secret on
//! the server side and performs the authorization-code exchange for a
//! front-end that cannot.
//!
//! ## Endpoints
//!
//! - [`login`] - Redirects the browser to Spotify's authorization page with
//!   `response_type=code`, the configured scopes and a one-time `state`.
//! - [`callback`] - Exchanges the returned `code` for tokens using HTTP Basic
//!   client authentication, then redirects to `FRONTEND_URI` with
//!   `access_token`, `refresh_token` and `expires_in`. Any failure redirects
//!   with `error=invalid_token` instead.
//! - [`refresh_token`] - Trades a refresh token for a new access token and
//!   answers with JSON.
//! - [`health`] - Status and version for monitoring.
//! - [`landing`] - Local page standing in for the front-end during the CLI
//!   login; only mounted by [`crate::server::login_router`].
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use spotbridge::{config::Config, server::{RelayState, router}};
//!
//! let app = router(Arc::new(RelayState::new(Config::from_env()?)));
//! ```

mod callback;
mod health;
mod landing;
mod login;
mod refresh;

pub use callback::callback;
pub use callback::failure_location;
pub use callback::success_location;
pub use health::health;
pub use landing::landing;
pub use login::login;
pub use refresh::refresh_token;
