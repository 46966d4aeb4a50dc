use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A game selected for monitoring.
///
/// Built from the scoreboard at setup time and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedGame {
    /// Feed identifier of the event.
    pub id: String,
    /// Human-readable matchup, e.g. `"Ohio State vs Penn State"`.
    pub display_name: String,
    /// Link to the game's summary / watch page.
    pub href: String,
    /// Link to the play-by-play JSON, when the scoreboard exposes one.
    pub feed_href: Option<String>,
}

impl TrackedGame {
    /// Short window-title hint: the first team token of the display name.
    ///
    /// Splits on the first `vs`, `vs.`, `at` or `@` separator. A name with no
    /// separator is returned whole.
    pub fn title_hint(&self) -> &str {
        static SEPARATOR: OnceLock<Regex> = OnceLock::new();
        let re = SEPARATOR
            .get_or_init(|| Regex::new(r"(?i)\s+(?:vs\.?|at|@)\s+").expect("regex is valid"));

        match re.find(&self.display_name) {
            Some(m) => self.display_name[..m.start()].trim(),
            None => self.display_name.trim(),
        }
    }
}

/// Wiring of one tracked game to the service and browser window showing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBinding {
    /// The game shown in this window.
    pub game: TrackedGame,
    /// Lowercase service name, e.g. `"espn"`.
    pub service: String,
    /// Resolved URL passed to the browser.
    pub url: String,
    /// Persistent browser profile used for this service.
    pub profile_dir: PathBuf,
    /// Set once the browser process has been spawned.
    pub launched: bool,
}

impl ServiceBinding {
    pub fn new(game: TrackedGame, service: String, url: String, profile_dir: PathBuf) -> Self {
        Self {
            game,
            service,
            url,
            profile_dir,
            launched: false,
        }
    }
}

/// Latest observed state of one game, recomputed on every poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayState {
    /// Free-text description of the latest play (may be empty).
    pub description: String,
    /// Field-position reading taken from the latest play, if any.
    pub field_position: Option<i64>,
}

impl PlayState {
    /// The state used whenever the feed is missing, failing or malformed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.field_position.is_none()
    }
}
