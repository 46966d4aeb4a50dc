//! Feed layer for the red-zone controller.
//!
//! Fetches the scoreboard to discover trackable games and polls each game's
//! play-by-play document for its latest play.

pub mod client;
pub mod error;
pub mod play_by_play;
pub mod scoreboard;

pub use client::{FeedClient, PlayFeed};
pub use error::{FeedError, Result};
pub use redzone_core as core;
