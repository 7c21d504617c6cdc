mod session;

pub use session::FileSessionStore;
pub use session::MemorySessionStore;
pub use session::RedirectOutcome;
pub use session::SessionStore;
pub use session::TokenManager;
pub use session::now_ms;
pub use session::parse_redirect;
