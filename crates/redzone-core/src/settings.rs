use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{RedzoneError, Result};

/// Name of the per-user state directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".cfb-redzone";

/// Default ESPN college-football scoreboard endpoint.
pub const DEFAULT_SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/football/college-football/scoreboard";

/// Placeholder substituted into service URL templates.
pub const GAME_HREF_PLACEHOLDER: &str = "{game_href}";

/// `~/.cfb-redzone`, falling back to the working directory without a home.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Follow several live college-football games and bring red-zone action to the front
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cfb-redzone",
    about = "Follow several live college-football games and bring red-zone action to the front",
    version
)]
pub struct Settings {
    /// Path to the JSON config file (defaults to ~/.cfb-redzone/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Scoreboard date as YYYYMMDD (defaults to today)
    #[arg(long, value_parser = parse_scoreboard_date)]
    pub date: Option<String>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Forget the services remembered from the last run
    #[arg(long)]
    pub clear: bool,
}

impl Settings {
    /// Parse the process arguments and apply `--debug`.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Self {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The config file this run reads from.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| AppConfig::default_path_in(&app_dir()))
    }
}

/// Validate a `YYYYMMDD` scoreboard date.
pub fn parse_scoreboard_date(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.len() != 8 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(RedzoneError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        .map(|_| trimmed.to_string())
        .map_err(|_| RedzoneError::InvalidDate(raw.to_string()))
}

// ── AppConfig (static file) ────────────────────────────────────────────────────

/// Browser executable for each desktop OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserPaths {
    #[serde(default = "default_windows_browser")]
    pub windows: PathBuf,
    #[serde(default = "default_macos_browser")]
    pub macos: PathBuf,
    #[serde(default = "default_linux_browser")]
    pub linux: PathBuf,
}

impl Default for BrowserPaths {
    fn default() -> Self {
        Self {
            windows: default_windows_browser(),
            macos: default_macos_browser(),
            linux: default_linux_browser(),
        }
    }
}

impl BrowserPaths {
    /// Executable for the OS this binary was built for.
    pub fn for_current_os(&self) -> &Path {
        if cfg!(target_os = "windows") {
            &self.windows
        } else if cfg!(target_os = "macos") {
            &self.macos
        } else {
            &self.linux
        }
    }
}

/// Static values read once at startup.
///
/// Every field is optional in the file; absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub browser_paths: BrowserPaths,
    /// Root under which one browser profile directory per service is kept.
    #[serde(default = "default_profile_root")]
    pub profile_root: PathBuf,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Minimum time a featured window stays in front before switching again.
    #[serde(default = "default_switch_grace_secs")]
    pub switch_grace_secs: u64,
    #[serde(default = "default_red_zone_yards")]
    pub red_zone_yards: i64,
    /// Service name → URL template containing `{game_href}`.
    #[serde(default = "default_service_url_templates")]
    pub service_url_templates: BTreeMap<String, String>,
    /// Broadcast networks listed at setup for reference.
    #[serde(default = "default_broadcasts")]
    pub broadcasts: Vec<String>,
    #[serde(default = "default_scoreboard_url")]
    pub scoreboard_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Pause after launching, so pages can load and logins can complete.
    #[serde(default = "default_initial_wait_secs")]
    pub initial_wait_secs: u64,
    #[serde(default = "default_launch_spacing_ms")]
    pub launch_spacing_ms: u64,
    #[serde(default = "default_focus_timeout_secs")]
    pub focus_timeout_secs: u64,
    #[serde(default = "default_fallback_focus_timeout_secs")]
    pub fallback_focus_timeout_secs: u64,
    #[serde(default = "default_focus_retry_ms")]
    pub focus_retry_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            browser_paths: BrowserPaths::default(),
            profile_root: default_profile_root(),
            poll_interval_secs: default_poll_interval_secs(),
            switch_grace_secs: default_switch_grace_secs(),
            red_zone_yards: default_red_zone_yards(),
            service_url_templates: default_service_url_templates(),
            broadcasts: default_broadcasts(),
            scoreboard_url: default_scoreboard_url(),
            request_timeout_secs: default_request_timeout_secs(),
            initial_wait_secs: default_initial_wait_secs(),
            launch_spacing_ms: default_launch_spacing_ms(),
            focus_timeout_secs: default_focus_timeout_secs(),
            fallback_focus_timeout_secs: default_fallback_focus_timeout_secs(),
            focus_retry_ms: default_focus_retry_ms(),
        }
    }
}

impl AppConfig {
    /// `<base_dir>/config.json`.
    pub fn default_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join("config.json")
    }

    /// Load the config, returning defaults when the file is absent.
    ///
    /// An unreadable or unparseable file is logged and also yields defaults,
    /// so a typo in the config never prevents a run.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring config file; using defaults");
                Self::default()
            }
        }
    }

    /// Strict load: `Ok(None)` when absent, `Err` when unreadable or invalid.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|source| RedzoneError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Reject values that would make the loop spin or never poll.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(RedzoneError::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.focus_retry_ms == 0 {
            return Err(RedzoneError::Config(
                "focus_retry_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the launch URL for `service`.
    ///
    /// Unknown services open the game's href unchanged.
    pub fn resolve_url(&self, service: &str, game_href: &str) -> String {
        match self.service_url_templates.get(service) {
            Some(template) => template.replace(GAME_HREF_PLACEHOLDER, game_href),
            None => game_href.to_string(),
        }
    }

    pub fn is_known_service(&self, service: &str) -> bool {
        self.service_url_templates.contains_key(service)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn switch_grace(&self) -> Duration {
        Duration::from_secs(self.switch_grace_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn focus_timeout(&self) -> Duration {
        Duration::from_secs(self.focus_timeout_secs)
    }

    pub fn fallback_focus_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_focus_timeout_secs)
    }

    pub fn focus_retry_interval(&self) -> Duration {
        Duration::from_millis(self.focus_retry_ms)
    }

    pub fn launch_spacing(&self) -> Duration {
        Duration::from_millis(self.launch_spacing_ms)
    }
}

fn default_windows_browser() -> PathBuf {
    PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe")
}

fn default_macos_browser() -> PathBuf {
    PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome")
}

fn default_linux_browser() -> PathBuf {
    PathBuf::from("/usr/bin/google-chrome")
}

fn default_profile_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cfb_redzone_profiles")
}

fn default_poll_interval_secs() -> u64 {
    12
}

fn default_switch_grace_secs() -> u64 {
    10
}

fn default_red_zone_yards() -> i64 {
    crate::scoring::DEFAULT_RED_ZONE_YARDS
}

fn default_service_url_templates() -> BTreeMap<String, String> {
    ["espn", "peacock", "fox"]
        .into_iter()
        .map(|s| (s.to_string(), GAME_HREF_PLACEHOLDER.to_string()))
        .collect()
}

fn default_broadcasts() -> Vec<String> {
    [
        "ESPN",
        "ESPN2",
        "ESPN3",
        "ESPN+",
        "ESPNU",
        "ABC",
        "Peacock",
        "Fox",
        "FS1",
        "FS2",
        "CBS",
        "NBC",
        "CBS Sports Network",
        "BTN",
        "ACC Network",
        "SEC Network",
        "Longhorn Network",
        "Pac-12 Network",
        "The CW",
        "TNT",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_scoreboard_url() -> String {
    DEFAULT_SCOREBOARD_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_initial_wait_secs() -> u64 {
    30
}

fn default_launch_spacing_ms() -> u64 {
    800
}

fn default_focus_timeout_secs() -> u64 {
    4
}

fn default_fallback_focus_timeout_secs() -> u64 {
    2
}

fn default_focus_retry_ms() -> u64 {
    300
}

// ── LastUsedServices ───────────────────────────────────────────────────────────

/// Services chosen on the previous run, saved to `~/.cfb-redzone/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct LastUsedServices {
    #[serde(default)]
    pub services: Vec<String>,
}

impl LastUsedServices {
    /// Return the default path to the persisted file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&app_dir())
    }

    /// Return the file path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join("last_used.json")
    }

    /// Load from an explicit path. Returns `Default` when the file is absent
    /// or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write to an explicit path.
    pub fn save_to(&self, path: &Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
