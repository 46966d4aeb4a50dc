//! Red-zone scoring heuristic.
//!
//! Each tracked game gets an additive, unnormalised score from its latest
//! [`PlayState`]. The field-position term rewards games close to the goal
//! line; the text terms reward play descriptions that mention the red zone or
//! a score. The highest score in a cycle is the candidate for featuring.
//!
//! Whether the field-position value is an absolute yard line or the yards to
//! go for a first down depends on the feed version; the heuristic does not
//! distinguish the two.

use crate::models::PlayState;

// ── Weights ───────────────────────────────────────────────────────────────────

/// Default red-zone threshold in yards.
pub const DEFAULT_RED_ZONE_YARDS: i64 = 20;

/// Baseline added to any field-position reading, so that a reading alone
/// outranks a weaker text-only signal.
pub const FIELD_POSITION_BASELINE: i64 = 50;

/// Bonus for a description announcing red-zone territory.
pub const RED_ZONE_BONUS: i64 = 100;

/// Bonus for a description announcing a scoring play.
pub const SCORING_PLAY_BONUS: i64 = 80;

/// Lowercase phrases that signal red-zone territory.
pub const RED_ZONE_PHRASES: &[&str] = &["in the red zone", "inside the 20", "inside the 10"];

/// Lowercase phrases that signal a scoring play.
pub const SCORING_PHRASES: &[&str] = &["touchdown"];

// ── ScoringPolicy ─────────────────────────────────────────────────────────────

/// Scores play states against a configurable red-zone threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    red_zone_yards: i64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RED_ZONE_YARDS)
    }
}

impl ScoringPolicy {
    pub fn new(red_zone_yards: i64) -> Self {
        Self { red_zone_yards }
    }

    pub fn red_zone_yards(&self) -> i64 {
        self.red_zone_yards
    }

    /// Contribution of a field-position reading: `max(0, (threshold - v) + 50)`.
    ///
    /// Saturates instead of overflowing on out-of-range feed values.
    pub fn field_position_score(&self, field_position: i64) -> i64 {
        self.red_zone_yards
            .saturating_sub(field_position)
            .saturating_add(FIELD_POSITION_BASELINE)
            .max(0)
    }

    /// Contribution of the play description. Both bonuses can apply at once.
    pub fn description_score(&self, description: &str) -> i64 {
        let text = description.to_lowercase();
        let mut score = 0;
        if RED_ZONE_PHRASES.iter().any(|p| text.contains(p)) {
            score += RED_ZONE_BONUS;
        }
        if SCORING_PHRASES.iter().any(|p| text.contains(p)) {
            score += SCORING_PLAY_BONUS;
        }
        score
    }

    /// Total score of one game's latest play. An empty state scores 0.
    pub fn score(&self, play: &PlayState) -> i64 {
        let position = play
            .field_position
            .map(|v| self.field_position_score(v))
            .unwrap_or(0);
        position.saturating_add(self.description_score(&play.description))
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// The best-scoring game of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Index of the game in the tracked list.
    pub index: usize,
    /// Score achieved by that game.
    pub score: i64,
}

/// Pick the highest score, first-seen winning ties.
///
/// Returns `None` only for an empty input; a zero maximum is still reported
/// so the caller can decide what a non-positive best means.
pub fn select_candidate<I>(scores: I) -> Option<Candidate>
where
    I: IntoIterator<Item = i64>,
{
    let mut best: Option<Candidate> = None;
    for (index, score) in scores.into_iter().enumerate() {
        match best {
            Some(b) if score <= b.score => {}
            _ => best = Some(Candidate { index, score }),
        }
    }
    best
}

// ── Tests ─────────────────────────────────────────────────────────────────────
