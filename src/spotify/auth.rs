use std::{sync::Arc, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::Deserialize;
use tokio::{sync::Mutex, task::JoinHandle};
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    info,
    management::{RedirectOutcome, SessionStore, TokenManager, now_ms},
    server::{self, LandingSlot},
    success,
    types::{Session, TokenResponse},
    utils, warning,
};

/// Which OAuth grant the authorization URL asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    /// `response_type=token`, the token comes back in the URL fragment.
    Implicit,
    /// `response_type=code`, the relay exchanges the code server side.
    AuthorizationCode,
}

impl GrantType {
    fn response_type(&self) -> &'static str {
        match self {
            GrantType::Implicit => "token",
            GrantType::AuthorizationCode => "code",
        }
    }
}

/// Builds the accounts authorization URL.
///
/// Scopes are joined with a single space which the URL encoder turns into
/// `+`, accepted by the accounts service the same way as `%20`.
///
/// # Errors
///
/// Returns [`Error::Config`] if the configured authorization URL is not a
/// valid URL.
pub fn authorize_url(config: &Config, grant: GrantType, state: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(&config.auth_url)
        .map_err(|e| Error::Config(format!("invalid SPOTIFY_AUTH_URL: {}", e)))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", &config.client_id)
            .append_pair("response_type", grant.response_type())
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("scope", &config.scopes().join(" "));
        if let Some(state) = state {
            query.append_pair("state", state);
        }
    }

    Ok(url)
}

/// `Authorization` header value for the confidential client.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// Error body of the accounts service, e.g. `{"error":"invalid_grant"}`.
#[derive(Debug, Deserialize)]
struct AccountsError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges an authorization code for tokens.
///
/// Posts `grant_type=authorization_code` to the token endpoint, authenticated
/// with HTTP Basic `client_id:client_secret`.
///
/// # Errors
///
/// Returns [`Error::Upstream`] with the accounts error description when the
/// code is rejected, or [`Error::Http`] on network failure.
pub async fn exchange_code(client: &Client, config: &Config, code: &str) -> Result<TokenResponse> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];
    post_token_form(client, config, &form).await
}

/// Exchanges a refresh token for a fresh access token.
///
/// Spotify may or may not rotate the refresh token; the returned response
/// carries one only when it did.
///
/// # Errors
///
/// Same as [`exchange_code`].
pub async fn refresh_token(
    client: &Client,
    config: &Config,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];
    post_token_form(client, config, &form).await
}

async fn post_token_form(
    client: &Client,
    config: &Config,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let res = client
        .post(&config.token_url)
        .header(
            reqwest::header::AUTHORIZATION,
            basic_auth_header(&config.client_id, &config.client_secret),
        )
        .form(form)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let message = res
            .json::<AccountsError>()
            .await
            .ok()
            .map(|e| e.error_description.unwrap_or(e.error));
        return Err(Error::upstream(status, message));
    }

    Ok(res.json::<TokenResponse>().await?)
}

/// Refreshes `session` if it carries a refresh token, persisting the result.
///
/// # Errors
///
/// Returns [`Error::TokenExpired`] when there is nothing to refresh with or
/// the accounts service rejects the refresh token.
pub async fn refresh_session<S: SessionStore>(
    client: &Client,
    config: &Config,
    manager: &TokenManager<S>,
    session: &Session,
) -> Result<Session> {
    let Some(current_refresh) = session.refresh_token.as_deref() else {
        return Err(Error::TokenExpired);
    };

    let token = match refresh_token(client, config, current_refresh).await {
        Ok(token) => token,
        Err(Error::Upstream { .. }) => return Err(Error::TokenExpired),
        Err(e) => return Err(e),
    };

    let refreshed = Session::new(token.access_token, token.expires_in, now_ms())
        .with_refresh_token(token.refresh_token.or_else(|| session.refresh_token.clone()));
    manager.store(&refreshed).await?;
    Ok(refreshed)
}

/// Restores the stored session, refreshing it first when it expired and
/// carries a refresh token.
///
/// # Arguments
///
/// * `client` - HTTP client used for the token endpoint
/// * `config` - relay configuration with the client credentials
/// * `manager` - token manager owning the stored session
///
/// # Returns
///
/// The valid session, or `None` when there is none. A session that could
/// not be refreshed is removed from storage, as [`TokenManager::restore`]
/// does for any expired session.
///
/// # Errors
///
/// Network and storage failures are returned. A rejected refresh token is
/// not an error.
pub async fn restore_or_refresh<S: SessionStore>(
    client: &Client,
    config: &Config,
    manager: &TokenManager<S>,
) -> Result<Option<Session>> {
    if let Some(stored) = manager.store_ref().load().await? {
        if !stored.is_valid_at(now_ms()) && stored.refresh_token.is_some() {
            info!("Session expired, refreshing...");
            match refresh_session(client, config, manager, &stored).await {
                Ok(refreshed) => return Ok(Some(refreshed)),
                Err(Error::TokenExpired) => {}
                Err(e) => return Err(e),
            }
        }
    }
    manager.restore().await
}

/// Runs the complete browser login through the built-in relay.
///
/// 1. Starts the relay with a local landing page standing in for the
///    front-end
/// 2. Opens `/login` of that relay in the default browser
/// 3. Waits for the relay to redirect the browser to the landing page
/// 4. Captures the session from the landing page query and persists it
///
/// The configured `SPOTIFY_REDIRECT_URI` must point at this relay's
/// `/callback` route.
///
/// # Errors
///
/// Returns an I/O or [`Error::Config`] error when the relay cannot be bound
/// (checked before the browser opens), [`Error::AuthRedirect`] if the login
/// failed or timed out, or an I/O error if the session cannot be saved.
pub async fn login<S: SessionStore>(
    config: &Config,
    manager: &TokenManager<S>,
    timeout: Duration,
) -> Result<Session> {
    let landing: LandingSlot = Arc::new(Mutex::new(None));
    // bind first so a taken port fails before the browser opens
    let listener = server::bind(config).await?;
    let addr = listener.local_addr()?;

    let mut relay_config = config.clone();
    relay_config.frontend_uri = format!("http://{}/landing", addr);

    let relay = tokio::spawn(server::start_login_server(
        listener,
        relay_config,
        Arc::clone(&landing),
    ));

    let login_url = format!("http://{}/login", addr);
    if webbrowser::open(&login_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            login_url
        )
    }

    let query = wait_for_landing(landing, &relay, timeout).await;

    let Some(query) = query else {
        if !relay.is_finished() {
            relay.abort();
            return Err(Error::AuthRedirect("Authentication timed out.".to_string()));
        }
        return match relay.await {
            Ok(Err(e)) => Err(e),
            _ => Err(Error::AuthRedirect("Login relay stopped.".to_string())),
        };
    };
    relay.abort();

    match manager.capture_from_redirect(&query).await? {
        RedirectOutcome::Captured(session) => {
            success!("Authentication successful!");
            Ok(session)
        }
        RedirectOutcome::Failed(reason) => Err(Error::AuthRedirect(reason)),
        RedirectOutcome::Ignored => Err(Error::AuthRedirect(
            "redirect carried no token".to_string(),
        )),
    }
}

/// Polls the landing slot until the browser arrived, the relay stopped or
/// `timeout` passed.
async fn wait_for_landing(
    landing: LandingSlot,
    relay: &JoinHandle<Result<()>>,
    timeout: Duration,
) -> Option<String> {
    use std::time::Instant;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Waiting for Spotify login in the browser...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let start = Instant::now();
    let mut result = None;

    while start.elapsed() < timeout && !relay.is_finished() {
        let lock = landing.lock().await;
        if let Some(query) = lock.as_ref() {
            result = Some(query.clone());
            break;
        }
        drop(lock);
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    spinner.finish_and_clear();
    result
}

/// Random `state` value tying the callback to the login that started it.
pub fn generate_state() -> String {
    utils::random_alphanumeric(16)
}
