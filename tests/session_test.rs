use spotbridge::{
    management::{
        FileSessionStore, MemorySessionStore, RedirectOutcome, SessionStore, TokenManager,
        parse_redirect,
    },
    types::Session,
};

const NOW: i64 = 1_700_000_000_000;

#[tokio::test]
async fn test_capture_fragment_is_valid_for_expires_in() {
    let manager = TokenManager::new(MemorySessionStore::default());

    let outcome = manager
        .capture_from_redirect_at("#access_token=XYZ&token_type=Bearer&expires_in=3600", NOW)
        .await
        .unwrap();

    let RedirectOutcome::Captured(session) = outcome else {
        panic!("expected a captured session, got {:?}", outcome);
    };
    assert_eq!(session.access_token, "XYZ");
    assert_eq!(session.expires_at - NOW, 3_600_000);
    assert!(session.is_valid_at(NOW + 3_599_999));
    assert!(!session.is_valid_at(NOW + 3_600_000));

    // persisted as a side effect
    assert_eq!(manager.store_ref().peek(), Some(session));
}

#[tokio::test]
async fn test_capture_error_fragment_stores_nothing() {
    let manager = TokenManager::new(MemorySessionStore::default());

    let outcome = manager
        .capture_from_redirect_at("#error=access_denied&state=abc", NOW)
        .await
        .unwrap();

    assert_eq!(outcome, RedirectOutcome::Failed("access_denied".to_string()));
    assert!(manager.store_ref().peek().is_none());
    assert!(outcome.into_result().is_err());
}

#[tokio::test]
async fn test_capture_without_token_is_a_no_op() {
    let existing = Session::new("old".to_string(), 60, NOW);
    let manager = TokenManager::new(MemorySessionStore::with_session(existing.clone()));

    for fragment in ["", "#", "#foo=bar", "%%%&&==", "?state=xyz"] {
        let outcome = manager.capture_from_redirect_at(fragment, NOW).await.unwrap();
        assert_eq!(outcome, RedirectOutcome::Ignored, "fragment {:?}", fragment);
    }
    assert_eq!(manager.store_ref().peek(), Some(existing));
}

#[test]
fn test_parse_relay_query_with_refresh_token() {
    let outcome = parse_redirect(
        "http://localhost:5173/home?access_token=A%2BB&refresh_token=R1&expires_in=3600",
        NOW,
    );

    let RedirectOutcome::Captured(session) = outcome else {
        panic!("expected a captured session");
    };
    assert_eq!(session.access_token, "A+B");
    assert_eq!(session.refresh_token.as_deref(), Some("R1"));
}

#[test]
fn test_parse_token_without_expiry_fails() {
    assert!(matches!(
        parse_redirect("access_token=XYZ", NOW),
        RedirectOutcome::Failed(_)
    ));
    assert!(matches!(
        parse_redirect("access_token=XYZ&expires_in=soon", NOW),
        RedirectOutcome::Failed(_)
    ));
}

#[tokio::test]
async fn test_restore_returns_valid_session() {
    let session = Session::new("abc".to_string(), 3600, NOW);
    let manager = TokenManager::new(MemorySessionStore::with_session(session.clone()));

    assert_eq!(manager.restore_at(NOW + 1000).await.unwrap(), Some(session));
}

#[tokio::test]
async fn test_restore_clears_expired_session() {
    let session = Session::new("abc".to_string(), 3600, NOW);
    let manager = TokenManager::new(MemorySessionStore::with_session(session));

    let restored = manager.restore_at(NOW + 3_600_000).await.unwrap();

    assert!(restored.is_none());
    assert!(manager.store_ref().peek().is_none());
}

#[tokio::test]
async fn test_clear_removes_session() {
    let session = Session::new("abc".to_string(), 3600, NOW);
    let manager = TokenManager::new(MemorySessionStore::with_session(session));

    manager.clear().await.unwrap();
    manager.clear().await.unwrap();

    assert!(manager.restore_at(NOW).await.unwrap().is_none());
}

#[test]
fn test_empty_token_is_never_valid() {
    let session = Session::new(String::new(), 3600, NOW);
    assert!(!TokenManager::<MemorySessionStore>::is_valid(&session, NOW));
}

#[tokio::test]
async fn test_file_store_round_trip_and_remove() {
    let dir = std::env::temp_dir().join(format!(
        "spotbridge-test-{}-{}",
        std::process::id(),
        NOW
    ));
    let store = FileSessionStore::new(dir.join("cache/session.json"));

    assert!(store.load().await.unwrap().is_none());

    let session = Session::new("abc".to_string(), 3600, NOW)
        .with_refresh_token(Some("refresh".to_string()));
    store.save(&session).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(session));

    store.remove().await.unwrap();
    assert!(store.load().await.unwrap().is_none());
    // removing twice is fine
    store.remove().await.unwrap();

    let _ = std::fs::remove_dir_all(dir);
}
