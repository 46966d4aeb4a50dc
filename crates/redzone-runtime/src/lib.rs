//! Runtime layer for CFB Red Zone.
//!
//! Launches the per-service browsers, locates and raises their windows, and
//! runs the poll/score/switch loop on top of the feed crate.

pub mod focus;
pub mod launcher;
pub mod monitor;

pub use redzone_core as core;
pub use redzone_feed as feed;
