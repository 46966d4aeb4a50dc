//! Latest-play extraction from play-by-play JSON.
//!
//! Play-by-play documents come in several shapes depending on the endpoint
//! version. Plays are located through an ordered list of candidate paths and
//! the first non-empty list wins:
//!
//! 1. `plays[]` at the top level,
//! 2. `drives.entries[*].plays[]`, flattened in drive order,
//! 3. `items[]` at the top level.
//!
//! Assumptions about the chosen list:
//! * entries are in chronological order, so the last entry is the latest play;
//! * the latest play is a JSON object (anything else yields an empty state);
//! * the description lives under one of [`DESCRIPTION_KEYS`];
//! * the field position lives directly on the play under one of
//!   [`FIELD_POSITION_KEYS`], as a number or a numeric string.
//!
//! None of these functions fail: a document that matches no candidate path
//! produces [`PlayState::empty`].

use redzone_core::models::PlayState;
use serde_json::Value;
use tracing::debug;

/// Keys probed, in order, for the play description.
pub const DESCRIPTION_KEYS: &[&str] = &["text", "description", "playDescription"];

/// Keys probed, in order, for the field-position reading.
pub const FIELD_POSITION_KEYS: &[&str] =
    &["yardLine", "yardLineNumber", "startYardLine", "yardsToGo"];

/// A named location where a list of plays may be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaysPath {
    /// `plays[]`
    TopLevelPlays,
    /// `drives.entries[*].plays[]`
    DriveEntries,
    /// `items[]`
    Items,
}

impl PlaysPath {
    /// Candidate paths in the order they are tried.
    pub const CHAIN: [PlaysPath; 3] = [
        PlaysPath::TopLevelPlays,
        PlaysPath::DriveEntries,
        PlaysPath::Items,
    ];

    /// Collect the plays at this path, or an empty list when it is absent.
    pub fn collect<'a>(&self, doc: &'a Value) -> Vec<&'a Value> {
        match self {
            PlaysPath::TopLevelPlays => array_at(doc, "plays"),
            PlaysPath::DriveEntries => doc
                .get("drives")
                .map(|drives| array_at(drives, "entries"))
                .unwrap_or_default()
                .into_iter()
                .flat_map(|drive| array_at(drive, "plays"))
                .collect(),
            PlaysPath::Items => array_at(doc, "items"),
        }
    }
}

/// Extracts the latest [`PlayState`] from a play-by-play document.
pub struct PlayExtractor;

impl PlayExtractor {
    /// Walk [`PlaysPath::CHAIN`] and return the last play of the first
    /// non-empty list.
    pub fn latest_play(doc: &Value) -> Option<&Value> {
        PlaysPath::CHAIN.iter().find_map(|path| {
            let plays = path.collect(doc);
            let last = plays.last().copied();
            if last.is_some() {
                debug!(?path, count = plays.len(), "located plays");
            }
            last
        })
    }

    /// Build the [`PlayState`] for a whole document.
    pub fn extract(doc: &Value) -> PlayState {
        match Self::latest_play(doc) {
            Some(play) if play.is_object() => PlayState {
                description: Self::description(play),
                field_position: Self::field_position(play),
            },
            _ => PlayState::empty(),
        }
    }

    /// First non-empty string under [`DESCRIPTION_KEYS`], else `""`.
    pub fn description(play: &Value) -> String {
        DESCRIPTION_KEYS
            .iter()
            .filter_map(|key| play.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    /// First key of [`FIELD_POSITION_KEYS`] that is present and coerces to
    /// an integer.
    pub fn field_position(play: &Value) -> Option<i64> {
        FIELD_POSITION_KEYS
            .iter()
            .filter_map(|key| play.get(*key))
            .find_map(coerce_integer)
    }
}

/// Integer coercion for field-position values.
///
/// * blank values (`null`, `false`, `""`, `[]`, `{}`) → `0`
/// * `true` → `1`
/// * numbers truncate toward zero
/// * strings parse after trimming (optional sign, decimal digits only)
/// * anything else → `None`
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Null => Some(0),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) if s.is_empty() => Some(0),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Array(a) if a.is_empty() => Some(0),
        Value::Object(o) if o.is_empty() => Some(0),
        _ => None,
    }
}

fn array_at<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().collect())
        .unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
