use std::{future::Future, path::PathBuf, sync::Mutex};

use chrono::Utc;
use url::form_urlencoded;

use crate::{
    config,
    error::{Error, Result},
    types::Session,
};

/// Where a [`TokenManager`] keeps its session between runs.
///
/// Implementations hold at most one session.
pub trait SessionStore: Send + Sync {
    /// Reads the stored session. A missing or unreadable session is
    /// `Ok(None)`, not an error.
    fn load(&self) -> impl Future<Output = Result<Option<Session>>> + Send;
    /// Replaces the stored session.
    fn save(&self, session: &Session) -> impl Future<Output = Result<()>> + Send;
    /// Deletes the stored session. Removing nothing succeeds.
    fn remove(&self) -> impl Future<Output = Result<()>> + Send;
}

/// JSON file in the local data directory.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store writing pretty printed JSON to `path`. Parent directories are
    /// created on the first save.
    pub fn new(path: PathBuf) -> Self {
        FileSessionStore { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> PathBuf {
        let mut path = config::data_dir();
        path.push("cache/session.json");
        path
    }
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // a corrupt file is the same as no session
        Ok(serde_json::from_str(&content).ok())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(session)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, mostly useful for tests and one-shot runs.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn with_session(session: Session) -> Self {
        MemorySessionStore {
            slot: Mutex::new(Some(session)),
        }
    }

    pub fn peek(&self) -> Option<Session> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.peek())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(session.clone());
        }
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}

/// Result of looking at a login redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// A token was found and stored.
    Captured(Session),
    /// The redirect reported a login failure; nothing was stored.
    Failed(String),
    /// The redirect carried nothing login related.
    Ignored,
}

impl RedirectOutcome {
    pub fn into_result(self) -> Result<Option<Session>> {
        match self {
            RedirectOutcome::Captured(session) => Ok(Some(session)),
            RedirectOutcome::Failed(reason) => Err(Error::AuthRedirect(reason)),
            RedirectOutcome::Ignored => Ok(None),
        }
    }
}

/// Owns the persisted bearer token.
pub struct TokenManager<S: SessionStore> {
    store: S,
}

impl TokenManager<FileSessionStore> {
    /// Token manager backed by `spotbridge/cache/session.json`.
    pub fn on_disk() -> Self {
        TokenManager::new(FileSessionStore::default())
    }
}

impl<S: SessionStore> TokenManager<S> {
    pub fn new(store: S) -> Self {
        TokenManager { store }
    }

    pub fn store_ref(&self) -> &S {
        &self.store
    }

    /// Returns the persisted session if it is still valid.
    ///
    /// An expired session is removed from storage before `None` is returned.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))` - a session valid right now
    /// - `Ok(None)` - nothing stored, or the stored session expired
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the store cannot be read or cleared.
    pub async fn restore(&self) -> Result<Option<Session>> {
        self.restore_at(now_ms()).await
    }

    /// [`TokenManager::restore`] against an explicit clock in Unix
    /// milliseconds.
    pub async fn restore_at(&self, now_ms: i64) -> Result<Option<Session>> {
        match self.store.load().await? {
            Some(session) if Self::is_valid(&session, now_ms) => Ok(Some(session)),
            Some(_) => {
                self.store.remove().await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Parses a redirect fragment or query string and stores the session it
    /// carries.
    ///
    /// Accepts `#access_token=..&expires_in=..` from the implicit grant as well
    /// as the relay's `?access_token=..&refresh_token=..&expires_in=..`. A
    /// malformed fragment never errors; only storage failures do.
    ///
    /// # Arguments
    ///
    /// * `fragment` - Fragment, query string or the complete redirect URL
    ///
    /// # Returns
    ///
    /// - [`RedirectOutcome::Captured`] - the session was stored
    /// - [`RedirectOutcome::Failed`] - the redirect carried `error=..` or a
    ///   token without a usable `expires_in`
    /// - [`RedirectOutcome::Ignored`] - nothing login related was found
    ///
    /// # Errors
    ///
    /// Returns an I/O or JSON error if the captured session cannot be saved.
    ///
    /// # Example
    ///
    /// ```
    /// let manager = TokenManager::on_disk();
    /// let outcome = manager
    ///     .capture_from_redirect("#access_token=XYZ&expires_in=3600")
    ///     .await?;
    /// ```
    pub async fn capture_from_redirect(&self, fragment: &str) -> Result<RedirectOutcome> {
        self.capture_from_redirect_at(fragment, now_ms()).await
    }

    pub async fn capture_from_redirect_at(
        &self,
        fragment: &str,
        now_ms: i64,
    ) -> Result<RedirectOutcome> {
        let outcome = parse_redirect(fragment, now_ms);
        if let RedirectOutcome::Captured(session) = &outcome {
            self.store.save(session).await?;
        }
        Ok(outcome)
    }

    /// Persists a session obtained outside of a redirect, e.g. by a refresh.
    pub async fn store(&self, session: &Session) -> Result<()> {
        self.store.save(session).await
    }

    /// Forgets the session. Used on logout and after a 401.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove().await
    }

    pub fn is_valid(session: &Session, now_ms: i64) -> bool {
        session.is_valid_at(now_ms)
    }
}

/// Current time in Unix milliseconds, the unit of [`Session::expires_at`].
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Pure part of [`TokenManager::capture_from_redirect`].
///
/// Everything up to the first `#` or `?` is skipped, so a full URL works as
/// well as a bare fragment. `expires_at` is `now_ms + expires_in * 1000`.
pub fn parse_redirect(fragment: &str, now_ms: i64) -> RedirectOutcome {
    let raw = fragment.trim();
    // tolerate a full URL as well as a bare fragment or query
    let raw = match raw.find(['#', '?']) {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    };

    let mut access_token = None;
    let mut refresh_token = None;
    let mut expires_in = None;
    let mut error = None;

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "access_token" if !value.is_empty() => access_token = Some(value.into_owned()),
            "refresh_token" if !value.is_empty() => refresh_token = Some(value.into_owned()),
            "expires_in" => expires_in = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (access_token, error) {
        (Some(token), _) => match expires_in.and_then(|e| e.trim().parse::<u64>().ok()) {
            Some(secs) => RedirectOutcome::Captured(
                Session::new(token, secs, now_ms).with_refresh_token(refresh_token),
            ),
            None => RedirectOutcome::Failed("missing or invalid expires_in".to_string()),
        },
        (None, Some(error)) => RedirectOutcome::Failed(error),
        (None, None) => RedirectOutcome::Ignored,
    }
}
