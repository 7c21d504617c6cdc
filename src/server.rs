use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{Extension, Router, routing::get};
use reqwest::Client;
use tokio::{net::TcpListener, sync::Mutex};

use crate::{api, config::Config, error::Result, info};

/// Query string the relay delivered to the local landing page, if any.
pub type LandingSlot = Arc<Mutex<Option<String>>>;

/// How long a `state` issued by `/login` stays acceptable.
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);
/// Upper bound of outstanding `state` values; the oldest goes first.
pub const MAX_PENDING_STATES: usize = 1024;

/// Shared state of the relay handlers.
pub struct RelayState {
    pub config: Config,
    pub http: Client,
    pending_states: Mutex<HashMap<String, Instant>>,
    state_ttl: Duration,
}

impl RelayState {
    pub fn new(config: Config) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: Config, http: Client) -> Self {
        RelayState {
            config,
            http,
            pending_states: Mutex::new(HashMap::new()),
            state_ttl: STATE_TTL,
        }
    }

    pub fn with_state_ttl(mut self, state_ttl: Duration) -> Self {
        self.state_ttl = state_ttl;
        self
    }

    /// Records a `state` handed out by `/login`.
    ///
    /// Expired entries are pruned on every insert. Once
    /// [`MAX_PENDING_STATES`] are outstanding the oldest one is dropped, so
    /// abandoned logins cannot grow the map without bound.
    pub async fn remember_state(&self, state: String) {
        let now = Instant::now();
        let mut pending = self.pending_states.lock().await;
        pending.retain(|_, issued| now.duration_since(*issued) < self.state_ttl);

        while pending.len() >= MAX_PENDING_STATES {
            let Some(oldest) = pending
                .iter()
                .min_by_key(|(_, issued)| **issued)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            pending.remove(&oldest);
        }

        pending.insert(state, now);
    }

    /// Consumes a `state` issued by `/login`.
    ///
    /// Each value is accepted once and only within the TTL.
    pub async fn take_state(&self, state: &str) -> bool {
        match self.pending_states.lock().await.remove(state) {
            Some(issued) => issued.elapsed() < self.state_ttl,
            None => false,
        }
    }

    /// Number of `state` values still waiting for their callback.
    pub async fn pending_states(&self) -> usize {
        self.pending_states.lock().await.len()
    }
}

/// Relay routes: `/login`, `/callback`, `/refresh_token`, `/health`.
pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/refresh_token", get(api::refresh_token))
        .layer(Extension(state))
}

/// Relay routes plus the `/landing` page the CLI login uses as front-end.
pub fn login_router(state: Arc<RelayState>, landing: LandingSlot) -> Router {
    router(state).route("/landing", get(api::landing).layer(Extension(landing)))
}

/// Runs the relay until the process is stopped.
///
/// # Errors
///
/// Returns an error when the address is invalid or cannot be bound.
pub async fn start_api_server(config: Config) -> Result<()> {
    let listener = bind(&config).await?;
    let addr = listener.local_addr()?;
    let app = router(Arc::new(RelayState::new(config)));

    info!("Relay listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Binds the relay address from `config`.
///
/// # Errors
///
/// Returns [`crate::error::Error::Config`] for an invalid address and an I/O
/// error when the port is taken.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr = config.server_addr()?;
    Ok(TcpListener::bind(&addr).await?)
}

/// Runs the relay with the CLI landing page mounted on an already bound
/// listener.
pub async fn start_login_server(
    listener: TcpListener,
    config: Config,
    landing: LandingSlot,
) -> Result<()> {
    let app = login_router(Arc::new(RelayState::new(config)), landing);
    axum::serve(listener, app).await?;
    Ok(())
}
