//! Core types for the red-zone controller.
//!
//! Holds the error type, CLI settings and static configuration, the game and
//! binding models, and the scoring heuristic shared by the feed and runtime
//! crates.

pub mod error;
pub mod models;
pub mod scoring;
pub mod settings;

pub use error::{RedzoneError, Result};
