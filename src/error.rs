//! Error kinds shared by the relay, the Web API client and the playback bridge.
//!
//! Network-origin errors are always turned into one of these variants at the
//! call site. None of them is fatal to the process: the worst outcome is that
//! the session is cleared and the user has to log in again.

use std::fmt;

use reqwest::StatusCode;

/// Convenient result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Which widget callback reported a [`Error::Widget`] error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetErrorKind {
    Initialization,
    Authentication,
    Account,
    Playback,
}

impl fmt::Display for WidgetErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WidgetErrorKind::Initialization => "initialization",
            WidgetErrorKind::Authentication => "authentication",
            WidgetErrorKind::Account => "account",
            WidgetErrorKind::Playback => "playback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The login redirect carried no usable token.
    #[error("Login failed: {0}")]
    AuthRedirect(String),

    /// The session expired locally or the API answered 401.
    #[error("Session expired, please log in again")]
    TokenExpired,

    /// The API kept answering 429 after the retry budget was spent.
    #[error("Spotify rate limit still active after {attempts} attempts")]
    UpstreamRateLimited { attempts: u32 },

    /// Any other non-2xx answer from Spotify.
    #[error("Spotify API error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },

    /// Error reported by the playback widget.
    #[error("Player {kind} error: {message}")]
    Widget {
        kind: WidgetErrorKind,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Builds an [`Error::Upstream`] falling back to a generic message when
    /// Spotify did not send one.
    pub fn upstream(status: StatusCode, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Error::Upstream { status, message }
    }

    /// Whether this error means the session must be dropped.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Error::TokenExpired
                | Error::Widget {
                    kind: WidgetErrorKind::Authentication,
                    ..
                }
        )
    }
}
