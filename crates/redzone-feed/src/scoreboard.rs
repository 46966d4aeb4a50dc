//! Scoreboard parsing.
//!
//! Turns a scoreboard document into the list of [`TrackedGame`] candidates
//! offered at setup. Events without a watch link are dropped because there
//! would be nothing to open in a browser.

use redzone_core::models::TrackedGame;
use serde_json::Value;
use tracing::debug;

/// `rel` tags marking a link to the game's watch / summary page.
const WATCH_RELS: &[&str] = &["summary", "gamepackage", "boxscore"];

/// `rel` tags marking a link to the play-by-play feed.
const FEED_RELS: &[&str] = &["playbyplay", "pbp"];

/// Keys probed, in order, for the event identifier.
const ID_KEYS: &[&str] = &["id", "uid", "gameId", "name"];

/// Parse every event of a scoreboard document, in feed order.
///
/// Candidate events are `events[]` followed by `competitions[]`.
pub fn parse_scoreboard(doc: &Value) -> Vec<TrackedGame> {
    let events = ["events", "competitions"]
        .iter()
        .filter_map(|key| doc.get(*key).and_then(Value::as_array))
        .flatten();

    let mut games = Vec::new();
    for event in events {
        match parse_event(event) {
            Some(game) => games.push(game),
            None => debug!(
                event = %event_id(event).unwrap_or_default(),
                "skipping event without a watch link"
            ),
        }
    }
    games
}

/// Parse a single event; `None` when it has no watch link.
pub fn parse_event(event: &Value) -> Option<TrackedGame> {
    let id = event_id(event).unwrap_or_default();
    let (watch, feed_href) = event_links(event);
    let href = watch.or_else(|| short_link(event))?;

    let teams = team_names(event);
    let display_name = if teams.is_empty() {
        event
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| id.clone())
    } else {
        teams.join(" vs ")
    };

    Some(TrackedGame {
        id,
        display_name,
        href,
        feed_href,
    })
}

/// First present identifier, numbers rendered as decimal strings.
fn event_id(event: &Value) -> Option<String> {
    ID_KEYS
        .iter()
        .filter_map(|key| event.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// `(watch_href, feed_href)` from `links[]`. Later matches overwrite earlier.
fn event_links(event: &Value) -> (Option<String>, Option<String>) {
    let mut watch = None;
    let mut feed = None;

    let links = event.get("links").and_then(Value::as_array);
    for link in links.into_iter().flatten() {
        let rels: Vec<&str> = link
            .get("rel")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let href = link
            .get("href")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        if rels.iter().any(|r| WATCH_RELS.contains(r)) {
            watch = href.clone();
        }
        if rels.iter().any(|r| FEED_RELS.contains(r)) {
            feed = href;
        }
    }

    (watch, feed)
}

/// `shortLinkHref` as a string, or the last string of a list.
fn short_link(event: &Value) -> Option<String> {
    match event.get("shortLinkHref")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .rev()
            .find_map(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Team names from `competitors[]`, else `competitions[0].competitors[]`.
fn team_names(event: &Value) -> Vec<String> {
    let competitors = event
        .get("competitors")
        .and_then(Value::as_array)
        .filter(|c| !c.is_empty())
        .or_else(|| {
            event
                .get("competitions")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("competitors"))
                .and_then(Value::as_array)
        });

    competitors
        .into_iter()
        .flatten()
        .filter_map(|c| {
            let candidates = [
                c.get("team").and_then(|t| t.get("shortDisplayName")),
                c.get("displayName"),
                c.get("abbreviation"),
            ];
            candidates
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .find(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
