//! Interactive console setup: which services, which games, and which service
//! opens each game.
//!
//! Prompts are generic over `BufRead`/`Write` so the whole flow can be driven
//! from byte buffers in tests.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};
use redzone_core::models::{ServiceBinding, TrackedGame};
use redzone_core::settings::AppConfig;
use redzone_runtime::launcher::BrowserLauncher;

// ── Parsing helpers ────────────────────────────────────────────────────────────

/// Split a comma-separated answer into lowercase service names, dropping
/// blanks and repeats.
pub fn parse_service_list(raw: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Indices picked from a list of `count` games.
///
/// `all` (any case) selects everything. Otherwise entries that are not plain
/// digits or fall outside the list are ignored; repeats keep their first
/// position.
pub fn parse_game_selection(raw: &str, count: usize) -> Vec<usize> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("all") {
        return (0..count).collect();
    }

    let mut seen = BTreeSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|s| s.parse::<usize>().ok())
        .filter(|&i| i < count && seen.insert(i))
        .collect()
}

/// The service a game opens with. Unknown or empty answers fall back to the
/// first chosen service; the flag reports whether that happened.
pub fn bind_service(raw: &str, chosen: &[String]) -> Option<(String, bool)> {
    let answer = raw.trim().to_lowercase();
    if chosen.iter().any(|s| *s == answer) {
        return Some((answer, false));
    }
    chosen.first().map(|first| (first.clone(), true))
}

/// One line of the game menu.
pub fn game_line(index: usize, game: &TrackedGame) -> String {
    let pbp = if game.feed_href.is_some() { "yes" } else { "no" };
    format!("[{index}] {}  (play_by_play: {pbp})", game.display_name)
}

// ── Prompter ───────────────────────────────────────────────────────────────────

/// Console question/answer session.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed line. EOF reads as empty.
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Ask which services the user has. An empty answer reuses `last_used`.
    pub fn choose_services(
        &mut self,
        config: &AppConfig,
        last_used: &[String],
    ) -> Result<Vec<String>> {
        let known: Vec<&str> = config.service_url_templates.keys().map(String::as_str).collect();
        self.say(&format!("Available services: {}", known.join(", ")))?;
        if !config.broadcasts.is_empty() {
            self.say(&format!("Known broadcasts: {}", config.broadcasts.join(", ")))?;
        }

        let question = if last_used.is_empty() {
            "Which services do you have access to? (comma separated) ".to_string()
        } else {
            format!(
                "Which services do you have access to? (comma separated, Enter for {}) ",
                last_used.join(",")
            )
        };
        let answer = self.ask(&question)?;

        let chosen = if answer.is_empty() {
            last_used.to_vec()
        } else {
            parse_service_list(&answer)
        };
        if chosen.is_empty() {
            bail!("no services chosen");
        }

        for service in chosen.iter().filter(|s| !config.is_known_service(s)) {
            tracing::warn!(service = %service, "unknown service");
            self.say(&format!(
                "Warning: {service} is not a known service. A profile will still be created for it."
            ))?;
        }
        Ok(chosen)
    }

    /// List the games and return the ones picked, in the order given.
    pub fn choose_games(&mut self, games: &[TrackedGame]) -> Result<Vec<TrackedGame>> {
        self.say("Found games:")?;
        for (i, game) in games.iter().enumerate() {
            self.say(&game_line(i, game))?;
        }
        let answer =
            self.ask("Enter indices of games to follow (comma separated, e.g. 0,3,5) or 'all': ")?;
        Ok(parse_game_selection(&answer, games.len())
            .into_iter()
            .map(|i| games[i].clone())
            .collect())
    }

    /// Ask which service opens each game and resolve its launch URL.
    pub fn bind_games(
        &mut self,
        games: Vec<TrackedGame>,
        services: &[String],
        config: &AppConfig,
        launcher: &BrowserLauncher,
    ) -> Result<Vec<ServiceBinding>> {
        self.say("")?;
        self.say("For each chosen game, specify which service you'll open it with.")?;

        let mut bindings = Vec::with_capacity(games.len());
        for game in games {
            self.say(&format!("Game: {}", game.display_name))?;
            let answer = self.ask(&format!(" Service (one of {}): ", services.join(", ")))?;
            let Some((service, fell_back)) = bind_service(&answer, services) else {
                bail!("no services chosen");
            };
            if fell_back {
                self.say(&format!("Unknown service, using {service}."))?;
            }

            let url = config.resolve_url(&service, &game.href);
            let profile_dir: PathBuf = launcher.profile_dir(&service);
            bindings.push(ServiceBinding::new(game, service, url, profile_dir));
        }
        Ok(bindings)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
