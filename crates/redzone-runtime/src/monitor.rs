//! The red-zone monitoring loop.
//!
//! Every poll cycle fetches the latest play of each tracked game in turn,
//! scores it, and, when the best score is positive and the grace period since
//! the last switch has run out, brings that game's window to the front.
//!
//! The only state carried between cycles is [`LoopState`], which is passed
//! into and returned from [`RedZoneMonitor::poll_cycle`].

use std::time::{Duration, Instant};

use redzone_core::models::{PlayState, ServiceBinding};
use redzone_core::scoring::{select_candidate, ScoringPolicy};
use redzone_core::settings::AppConfig;
use redzone_feed::PlayFeed;
use tracing::{debug, info, warn};

use crate::focus::{FocusController, WindowBackend};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Timing knobs of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Pause between poll cycles.
    pub poll_interval: Duration,
    /// Minimum dwell time of a featured window before switching again.
    pub switch_grace: Duration,
    /// Window search budget when matching on the team-name hint.
    pub focus_timeout: Duration,
    /// Window search budget when retrying with the launch URL.
    pub fallback_focus_timeout: Duration,
}

impl From<&AppConfig> for MonitorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            switch_grace: config.switch_grace(),
            focus_timeout: config.focus_timeout(),
            fallback_focus_timeout: config.fallback_focus_timeout(),
        }
    }
}

// ── LoopState ─────────────────────────────────────────────────────────────────

/// State threaded from one poll cycle to the next.
///
/// `featured` is `None` while idle; at most one game is featured at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopState {
    /// When focus was last switched successfully.
    pub last_switch: Option<Instant>,
    /// Id of the game whose window was last brought to the front.
    pub featured: Option<String>,
}

impl LoopState {
    /// `true` when more than `grace` has passed since the last switch, or
    /// when no switch has happened yet.
    pub fn grace_elapsed(&self, now: Instant, grace: Duration) -> bool {
        match self.last_switch {
            None => true,
            Some(at) => now.saturating_duration_since(at) > grace,
        }
    }

    fn featuring(self, game_id: &str, at: Instant) -> Self {
        Self {
            last_switch: Some(at),
            featured: Some(game_id.to_string()),
        }
    }
}

// ── CycleOutcome ──────────────────────────────────────────────────────────────

/// What a single poll cycle decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No game scored above zero.
    Idle,
    /// A game scored but the grace period has not run out.
    Holding { game_id: String, score: i64 },
    /// Focus moved to this game.
    Switched { game_id: String, score: i64 },
    /// Neither hint located the game's window.
    SwitchFailed { game_id: String, score: i64 },
}

/// Latest play and score of one tracked game within a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReading {
    pub play: PlayState,
    pub score: i64,
}

// ── RedZoneMonitor ────────────────────────────────────────────────────────────

/// Polls the feed, scores tracked games and drives window focus.
pub struct RedZoneMonitor<F, B> {
    feed: F,
    focus: FocusController<B>,
    policy: ScoringPolicy,
    config: MonitorConfig,
}

impl<F: PlayFeed, B: WindowBackend> RedZoneMonitor<F, B> {
    pub fn new(
        feed: F,
        focus: FocusController<B>,
        policy: ScoringPolicy,
        config: MonitorConfig,
    ) -> Self {
        Self {
            feed,
            focus,
            policy,
            config,
        }
    }

    pub fn focus(&self) -> &FocusController<B> {
        &self.focus
    }

    /// Poll forever. Only returns when the surrounding task is dropped.
    pub async fn run(&self, bindings: &[ServiceBinding]) {
        let mut state = LoopState::default();
        loop {
            let (next, outcome) = self.poll_cycle(bindings, state).await;
            state = next;
            debug!(?outcome, featured = ?state.featured, "poll cycle complete");
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Fetch and score every game, one after another.
    ///
    /// Feed failures never escape: they are logged and scored as an empty
    /// play.
    pub async fn read_games(&self, bindings: &[ServiceBinding]) -> Vec<GameReading> {
        let mut readings = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let game = &binding.game;
            let play = match self.feed.latest_play(game.feed_href.as_deref()).await {
                Ok(play) => play,
                Err(e) => {
                    debug!(game = %game.display_name, error = %e, "latest play unavailable");
                    PlayState::empty()
                }
            };
            let score = self.policy.score(&play);
            debug!(
                game = %game.display_name,
                score,
                field_position = ?play.field_position,
                "game scored"
            );
            readings.push(GameReading { play, score });
        }
        readings
    }

    /// Run one cycle and return the updated state with what was decided.
    pub async fn poll_cycle(
        &self,
        bindings: &[ServiceBinding],
        state: LoopState,
    ) -> (LoopState, CycleOutcome) {
        let readings = self.read_games(bindings).await;

        let best = match select_candidate(readings.iter().map(|r| r.score)) {
            Some(best) if best.score > 0 => best,
            _ => return (state, CycleOutcome::Idle),
        };
        let binding = &bindings[best.index];
        let reading = &readings[best.index];
        let game_id = binding.game.id.clone();

        let now = Instant::now();
        if !state.grace_elapsed(now, self.config.switch_grace) {
            debug!(game = %binding.game.display_name, score = best.score, "within grace period");
            return (
                state,
                CycleOutcome::Holding {
                    game_id,
                    score: best.score,
                },
            );
        }

        info!(
            game = %binding.game.display_name,
            score = best.score,
            description = %reading.play.description,
            field_position = ?reading.play.field_position,
            "switching featured game"
        );

        if self.switch_to(binding).await {
            let state = state.featuring(&game_id, now);
            (
                state,
                CycleOutcome::Switched {
                    game_id,
                    score: best.score,
                },
            )
        } else {
            warn!(
                game = %binding.game.display_name,
                "could not locate the game's window; check the window title or launch URL"
            );
            (
                state,
                CycleOutcome::SwitchFailed {
                    game_id,
                    score: best.score,
                },
            )
        }
    }

    /// Bring the binding's window forward: team-name hint first, launch URL
    /// second.
    pub async fn switch_to(&self, binding: &ServiceBinding) -> bool {
        let hint = binding.game.title_hint();
        if self.focus.activate(hint, self.config.focus_timeout).await {
            return true;
        }
        debug!(hint, url = %binding.url, "title hint failed; retrying with launch URL");
        self.focus
            .activate(&binding.url, self.config.fallback_focus_timeout)
            .await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::tests::FakeBackend;
    use redzone_core::models::TrackedGame;
    use redzone_feed::FeedError;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    // ── helpers ───────────────────────────────────────────────────────────

    /// Canned play states keyed by feed URL; unknown URLs fail like a 503.
    #[derive(Default)]
    struct FakeFeed {
        plays: HashMap<String, PlayState>,
        calls: Cell<usize>,
    }

    impl FakeFeed {
        fn with(mut self, url: &str, description: &str, field_position: Option<i64>) -> Self {
            self.plays.insert(
                url.to_string(),
                PlayState {
                    description: description.to_string(),
                    field_position,
                },
            );
            self
        }
    }

    impl PlayFeed for FakeFeed {
        async fn latest_play(&self, feed_ref: Option<&str>) -> redzone_feed::Result<PlayState> {
            self.calls.set(self.calls.get() + 1);
            let Some(url) = feed_ref else {
                return Ok(PlayState::empty());
            };
            self.plays
                .get(url)
                .cloned()
                .ok_or_else(|| FeedError::Status {
                    url: url.to_string(),
                    status: 503,
                })
        }
    }

    fn binding(id: &str, name: &str) -> ServiceBinding {
        ServiceBinding::new(
            TrackedGame {
                id: id.to_string(),
                display_name: name.to_string(),
                href: format!("https://watch.example/{id}"),
                feed_href: Some(format!("https://feed.example/{id}")),
            },
            "espn".to_string(),
            format!("https://watch.example/{id}"),
            PathBuf::from("/tmp/profiles/espn"),
        )
    }

    fn config(grace: Duration) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_millis(10),
            switch_grace: grace,
            focus_timeout: Duration::from_millis(20),
            fallback_focus_timeout: Duration::from_millis(10),
        }
    }

    fn monitor(
        feed: FakeFeed,
        windows: &[&str],
        grace: Duration,
    ) -> RedZoneMonitor<FakeFeed, FakeBackend> {
        RedZoneMonitor::new(
            feed,
            FocusController::new(FakeBackend::with_titles(windows), Duration::from_millis(5)),
            ScoringPolicy::new(20),
            config(grace),
        )
    }

    // ── LoopState ─────────────────────────────────────────────────────────

    #[test]
    fn test_grace_elapsed_before_first_switch() {
        assert!(LoopState::default().grace_elapsed(Instant::now(), Duration::from_secs(600)));
    }

    #[test]
    fn test_grace_elapsed_is_strict() {
        let t0 = Instant::now();
        let grace = Duration::from_secs(10);
        let state = LoopState::default().featuring("x", t0);

        assert!(!state.grace_elapsed(t0, grace));
        assert!(!state.grace_elapsed(t0 + grace, grace));
        assert!(state.grace_elapsed(t0 + grace + Duration::from_millis(1), grace));
    }

    #[test]
    fn test_monitor_config_from_app_config() {
        let cfg = MonitorConfig::from(&AppConfig::default());
        assert_eq!(cfg.poll_interval, Duration::from_secs(12));
        assert_eq!(cfg.switch_grace, Duration::from_secs(10));
        assert_eq!(cfg.focus_timeout, Duration::from_secs(4));
        assert_eq!(cfg.fallback_focus_timeout, Duration::from_secs(2));
    }

    // ── scoring within a cycle ────────────────────────────────────────────

    #[tokio::test]
    async fn test_read_games_swallows_feed_errors() {
        let feed = FakeFeed::default().with("https://feed.example/a", "touchdown", None);
        let mon = monitor(feed, &[], Duration::ZERO);
        let bindings = [binding("a", "A vs B"), binding("broken", "C vs D")];

        let readings = mon.read_games(&bindings).await;
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].score, 80);
        assert_eq!(readings[1].score, 0);
        assert!(readings[1].play.is_empty());
        assert_eq!(mon.feed.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_higher_score_wins() {
        // A: red-zone text (100) + yard line 30 (40) = 140; B: touchdown = 80.
        let feed = FakeFeed::default()
            .with("https://feed.example/a", "Now inside the 20", Some(30))
            .with("https://feed.example/b", "Touchdown!", None);
        let mon = monitor(feed, &["Auburn vs LSU - Chrome", "Iowa vs Utah - Chrome"], Duration::ZERO);
        let bindings = [binding("a", "Auburn vs LSU"), binding("b", "Iowa vs Utah")];

        let (state, outcome) = mon.poll_cycle(&bindings, LoopState::default()).await;
        assert_eq!(
            outcome,
            CycleOutcome::Switched {
                game_id: "a".to_string(),
                score: 140
            }
        );
        assert_eq!(state.featured.as_deref(), Some("a"));
        assert!(state.last_switch.is_some());
    }

    #[tokio::test]
    async fn test_idle_when_nothing_scores() {
        let feed = FakeFeed::default().with("https://feed.example/a", "Punt", Some(90));
        let mon = monitor(feed, &["Auburn vs LSU"], Duration::ZERO);
        let bindings = [binding("a", "Auburn vs LSU"), binding("b", "Iowa vs Utah")];

        let (state, outcome) = mon.poll_cycle(&bindings, LoopState::default()).await;
        assert_eq!(outcome, CycleOutcome::Idle);
        assert_eq!(state, LoopState::default());
        assert_eq!(mon.focus().backend().scans(), 0);
    }

    #[tokio::test]
    async fn test_idle_with_no_games() {
        let mon = monitor(FakeFeed::default(), &[], Duration::ZERO);
        let (_, outcome) = mon.poll_cycle(&[], LoopState::default()).await;
        assert_eq!(outcome, CycleOutcome::Idle);
    }

    // ── grace period ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_no_switch_within_grace_period() {
        let feed = FakeFeed::default().with("https://feed.example/a", "touchdown", None);
        let mon = monitor(feed, &["Auburn vs LSU"], Duration::from_secs(60));
        let bindings = [binding("a", "Auburn vs LSU")];

        let before = LoopState::default().featuring("other", Instant::now());
        let (state, outcome) = mon.poll_cycle(&bindings, before.clone()).await;

        assert_eq!(
            outcome,
            CycleOutcome::Holding {
                game_id: "a".to_string(),
                score: 80
            }
        );
        assert_eq!(state, before);
        assert!(mon.focus().backend().raised().is_empty());
    }

    #[tokio::test]
    async fn test_grace_blocks_the_following_cycle() {
        let feed = FakeFeed::default()
            .with("https://feed.example/a", "touchdown", None)
            .with("https://feed.example/b", "in the red zone", None);
        let mon = monitor(feed, &["Auburn vs LSU", "Iowa vs Utah"], Duration::from_secs(60));
        let bindings = [binding("a", "Auburn vs LSU"), binding("b", "Iowa vs Utah")];

        let (state, first) = mon.poll_cycle(&bindings, LoopState::default()).await;
        assert!(matches!(first, CycleOutcome::Switched { ref game_id, score: 100 } if game_id == "b"));

        let (state2, second) = mon.poll_cycle(&bindings, state.clone()).await;
        assert!(matches!(second, CycleOutcome::Holding { .. }));
        assert_eq!(state2, state);
        assert_eq!(mon.focus().backend().raised().len(), 1);
    }

    // ── switching ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_end_to_end_touchdown_beats_field_position() {
        // X sits at the 8 (62 points); Y has a touchdown call (80 points).
        let feed = FakeFeed::default()
            .with("https://feed.example/x", "Rush for 2 yards", Some(8))
            .with("https://feed.example/y", "TOUCHDOWN Buckeyes", None);
        let mon = monitor(
            feed,
            &[
                "Texas vs Michigan - ESPN - Google Chrome",
                "Ohio State vs Penn State - Peacock - Google Chrome",
            ],
            Duration::from_secs(10),
        );
        let bindings = [
            binding("x", "Texas vs Michigan"),
            binding("y", "Ohio State vs Penn State"),
        ];

        let readings = mon.read_games(&bindings).await;
        assert_eq!(readings[0].score, 62);
        assert_eq!(readings[1].score, 80);

        let (state, outcome) = mon.poll_cycle(&bindings, LoopState::default()).await;
        assert_eq!(
            outcome,
            CycleOutcome::Switched {
                game_id: "y".to_string(),
                score: 80
            }
        );
        assert_eq!(state.featured.as_deref(), Some("y"));
        assert_eq!(
            mon.focus().backend().raised(),
            vec!["Ohio State vs Penn State - Peacock - Google Chrome".to_string()]
        );
    }

    #[tokio::test]
    async fn test_switch_falls_back_to_launch_url() {
        let feed = FakeFeed::default().with("https://feed.example/a", "touchdown", None);
        // No window carries the team name, but one shows the URL.
        let mon = monitor(
            feed,
            &["https://watch.example/a - Google Chrome"],
            Duration::ZERO,
        );
        let bindings = [binding("a", "Auburn vs LSU")];

        let (state, outcome) = mon.poll_cycle(&bindings, LoopState::default()).await;
        assert!(matches!(outcome, CycleOutcome::Switched { .. }));
        assert_eq!(state.featured.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_switch_failure_leaves_state_untouched() {
        let feed = FakeFeed::default().with("https://feed.example/a", "touchdown", None);
        let mon = monitor(feed, &["Spreadsheet"], Duration::ZERO);
        let bindings = [binding("a", "Auburn vs LSU")];

        let (state, outcome) = mon.poll_cycle(&bindings, LoopState::default()).await;
        assert_eq!(
            outcome,
            CycleOutcome::SwitchFailed {
                game_id: "a".to_string(),
                score: 80
            }
        );
        assert_eq!(state, LoopState::default());
    }

    #[tokio::test]
    async fn test_run_keeps_polling_until_dropped() {
        let feed = FakeFeed::default().with("https://feed.example/a", "touchdown", None);
        let mon = monitor(feed, &["Auburn vs LSU"], Duration::from_secs(60));
        let bindings = [binding("a", "Auburn vs LSU")];

        let _ = tokio::time::timeout(Duration::from_millis(100), mon.run(&bindings)).await;

        // Several cycles ran, but the grace period allowed a single switch.
        assert!(mon.feed.calls.get() >= 2);
        assert_eq!(mon.focus().backend().raised().len(), 1);
    }
}
