//! # CLI Module
//!
//! Command-line front-end of spotbridge. It stands in for the browser UI:
//! logging in, showing the playlist grid as a table and acting as a player
//! bar for a Spotify Connect device.
//!
//! ## Commands
//!
//! - [`serve`] - Runs the OAuth relay
//! - [`login`] - Browser login through the relay, stores the session
//! - [`logout`] - Forgets the stored session
//! - [`status`] - Shows whether the stored session is still valid
//! - [`list_playlists`] - Lists playlists, optionally filtered by name
//! - [`search_tracks`] - Searches the catalogue for tracks
//! - [`player`] - Watches or controls playback on a Connect device
//!
//! ## Error Handling
//!
//! Every error is reported where it happens and never ends the process with
//! a panic. A 401 from Spotify removes the stored session so the next
//! command asks for a fresh login.
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotbridge login
//! spotbridge playlists --search chill
//! spotbridge player toggle
//! spotbridge player watch
//! ```

mod auth;
mod player;
mod playlists;
mod serve;

pub use auth::active_session;
pub use auth::login;
pub use auth::logout;
pub use auth::status;
pub use player::PlayerAction;
pub use player::player;
pub use playlists::list_playlists;
pub use playlists::search_tracks;
pub use serve::serve;
