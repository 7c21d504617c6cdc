mod common;

use spotbridge::{config::DEFAULT_SCOPE, error::Error};

#[test]
fn test_scopes_accept_any_separator() {
    let mut config = common::test_config("http://accounts", "http://api");

    for scope in [
        "streaming user-read-email",
        "streaming%20user-read-email",
        "streaming,user-read-email",
        "  streaming ,  user-read-email ",
    ] {
        config.scope = scope.to_string();
        assert_eq!(config.scopes(), vec!["streaming", "user-read-email"], "{}", scope);
    }
}

#[test]
fn test_default_scope_allows_playback_control() {
    let mut config = common::test_config("http://accounts", "http://api");
    config.scope = DEFAULT_SCOPE.to_string();

    let scopes = config.scopes();
    for needed in [
        "streaming",
        "user-modify-playback-state",
        "user-read-playback-state",
        "playlist-read-private",
    ] {
        assert!(scopes.iter().any(|s| s == needed), "{}", needed);
    }
}

#[test]
fn test_server_addr() {
    let mut config = common::test_config("http://accounts", "http://api");

    assert_eq!(config.server_addr().unwrap().to_string(), "127.0.0.1:6000");

    config.host = "localhost".to_string();
    assert!(matches!(config.server_addr(), Err(Error::Config(_))));
}
