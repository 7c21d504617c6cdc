use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::sleep;

use crate::{
    config::Config,
    error::{Error, Result},
    types::ApiErrorBody,
    warning,
};

/// How the client reacts to 429 Too Many Requests.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every further one.
    pub base_delay: Duration,
    /// Upper bound for both the computed and the `Retry-After` delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero based).
    ///
    /// # Arguments
    ///
    /// * `retry` - How many retries already happened
    /// * `retry_after` - Delay requested by the `Retry-After` header, if any
    ///
    /// # Returns
    ///
    /// `retry_after` when present and not above `max_delay`, otherwise
    /// `base_delay * 2^retry` capped at `max_delay`.
    ///
    /// # Example
    ///
    /// ```
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.backoff(2, None), Duration::from_secs(2));
    /// ```
    pub fn backoff(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let computed = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry));
        match retry_after {
            Some(hint) if hint <= self.max_delay => hint,
            _ => computed.min(self.max_delay),
        }
    }
}

/// Bearer authenticated Web API client.
///
/// Every call takes the access token explicitly; the client never touches
/// the session. A 401 surfaces as [`Error::TokenExpired`] so the caller can
/// clear the session.
#[derive(Debug, Clone)]
pub struct WebApi {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl WebApi {
    /// Client for the Web API at `base_url`, e.g. `https://api.spotify.com/v1`.
    ///
    /// A trailing slash is dropped so paths can always start with `/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Same as [`WebApi::new`] with a caller supplied [`Client`].
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        WebApi {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Client for `SPOTIFY_API_URL` with the default retry policy.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token)
    }

    /// Sends the request built by `build`, retrying on 429.
    ///
    /// The builder closure runs once per attempt since a sent request cannot
    /// be reused.
    async fn send_with_retry(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let mut retry = 0;
        loop {
            let response = build().send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if retry >= self.retry.max_retries {
                    return Err(Error::UpstreamRateLimited {
                        attempts: retry + 1,
                    });
                }
                let delay = self.retry.backoff(retry, retry_after(&response));
                warning!("Rate limited by Spotify, retrying in {} ms", delay.as_millis());
                sleep(delay).await;
                retry += 1;
                continue;
            }

            return check_status(response).await;
        }
    }

    /// GET returning the decoded JSON body.
    ///
    /// # Arguments
    ///
    /// * `token` - Bearer access token
    /// * `path` - Path below the base URL, starting with `/`
    /// * `query` - Query parameters, encoded by reqwest
    ///
    /// # Errors
    ///
    /// - [`Error::TokenExpired`] on 401
    /// - [`Error::UpstreamRateLimited`] when 429 persists past the retry budget
    /// - [`Error::Upstream`] on any other non-2xx, with Spotify's message
    /// - [`Error::Http`] or [`Error::Json`] on network or decoding failures
    ///
    /// # Example
    ///
    /// ```
    /// let page: Page<Playlist> = api
    ///     .get_json(token, "/me/playlists", &[("limit", "20".to_string())])
    ///     .await?;
    /// ```
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .send_with_retry(|| self.request(Method::GET, path, token).query(query))
            .await?;
        Ok(response.json::<T>().await?)
    }

    /// GET where 204 No Content means "nothing there".
    ///
    /// # Returns
    ///
    /// `Ok(None)` for 204 or an empty body, `Ok(Some(..))` for a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`WebApi::get_json`].
    pub async fn get_optional_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
    ) -> Result<Option<T>> {
        let response = self
            .send_with_retry(|| self.request(Method::GET, path, token))
            .await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// Request with an optional JSON body whose response body is discarded.
    ///
    /// Used for the player endpoints, which answer 204 on success.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method, `PUT` or `POST` for the player endpoints
    /// * `token` - Bearer access token
    /// * `path` - Path below the base URL
    /// * `query` - Query parameters
    /// * `body` - JSON body; `None` sends an empty body with `Content-Length: 0`
    ///
    /// # Errors
    ///
    /// Same as [`WebApi::get_json`].
    pub async fn send_empty<B: Serialize>(
        &self,
        method: Method,
        token: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<()> {
        self.send_with_retry(|| {
            let request = self.request(method.clone(), path, token).query(query);
            match body {
                Some(body) => request.json(body),
                // the player endpoints reject PUT/POST without a length
                None => request.header(reqwest::header::CONTENT_LENGTH, 0),
            }
        })
        .await
        .map(|_| ())
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::TokenExpired);
    }

    let message = response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error.message);
    Err(Error::upstream(status, message))
}
