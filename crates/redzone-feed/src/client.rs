//! HTTP client for the scoreboard and play-by-play feeds.

use std::time::Duration;

use redzone_core::models::{PlayState, TrackedGame};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{FeedError, Result};
use crate::play_by_play::PlayExtractor;
use crate::scoreboard::parse_scoreboard;

/// Source of the latest play for a tracked game.
///
/// The monitoring loop depends on this trait rather than on [`FeedClient`]
/// so that cycles can be driven from canned states.
#[allow(async_fn_in_trait)]
pub trait PlayFeed {
    /// Latest play behind `feed_ref`.
    ///
    /// Only transport and HTTP-status failures are errors. A missing
    /// reference or an unrecognisable body yields [`PlayState::empty`].
    async fn latest_play(&self, feed_ref: Option<&str>) -> Result<PlayState>;
}

/// Scoreboard + play-by-play client.
///
/// # Example
/// ```no_run
/// # async fn demo() -> Result<(), redzone_feed::FeedError> {
/// use std::time::Duration;
/// use redzone_feed::client::FeedClient;
///
/// let client = FeedClient::new(
///     "https://site.api.espn.com/apis/site/v2/sports/football/college-football/scoreboard",
///     Some("20241012".to_string()),
///     Duration::from_secs(10),
/// )?;
/// for game in client.list_events().await? {
///     println!("{}", game.display_name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FeedClient {
    http: Client,
    scoreboard_url: String,
    /// `YYYYMMDD`; `None` asks the feed for today.
    date: Option<String>,
}

impl FeedClient {
    pub fn new(scoreboard_url: &str, date: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cfb-redzone/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FeedError::Client)?;

        Ok(Self {
            http,
            scoreboard_url: scoreboard_url.to_string(),
            date,
        })
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// Fetch the scoreboard and parse it into trackable games.
    ///
    /// Any failure here is fatal to the caller: without the event list there
    /// is nothing to monitor.
    pub async fn list_events(&self) -> Result<Vec<TrackedGame>> {
        let mut request = self.http.get(&self.scoreboard_url);
        if let Some(date) = &self.date {
            request = request.query(&[("dates", date.as_str())]);
        }

        let body = self.send(&self.scoreboard_url, request).await?;
        let doc: Value = serde_json::from_slice(&body).map_err(|source| FeedError::Decode {
            url: self.scoreboard_url.clone(),
            source,
        })?;

        let games = parse_scoreboard(&doc);
        debug!(count = games.len(), "scoreboard parsed");
        Ok(games)
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(|source| FeedError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| FeedError::Request {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

impl PlayFeed for FeedClient {
    async fn latest_play(&self, feed_ref: Option<&str>) -> Result<PlayState> {
        let Some(url) = feed_ref.filter(|u| !u.is_empty()) else {
            return Ok(PlayState::empty());
        };

        let body = self.send(url, self.http.get(url)).await?;
        match serde_json::from_slice::<Value>(&body) {
            Ok(doc) => Ok(PlayExtractor::extract(&doc)),
            Err(e) => {
                debug!(url, error = %e, "play-by-play body is not JSON");
                Ok(PlayState::empty())
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const SCOREBOARD: &str = r#"{
        "events": [
            {
                "id": "401",
                "links": [
                    { "rel": ["summary"], "href": "https://watch.example/401" },
                    { "rel": ["pbp"], "href": "https://feed.example/401" }
                ],
                "competitors": [
                    { "team": { "shortDisplayName": "Georgia" } },
                    { "team": { "shortDisplayName": "Alabama" } }
                ]
            },
            { "id": "402" }
        ]
    }"#;

    fn client_for(server: &mockito::ServerGuard, date: Option<&str>) -> FeedClient {
        FeedClient::new(
            &format!("{}/scoreboard", server.url()),
            date.map(str::to_string),
            Duration::from_secs(5),
        )
        .expect("client builds")
    }

    // ── list_events ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_list_events_sends_date_and_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/scoreboard")
            .match_query(Matcher::UrlEncoded("dates".into(), "20241012".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SCOREBOARD)
            .create_async()
            .await;

        let client = client_for(&server, Some("20241012"));
        assert_eq!(client.date(), Some("20241012"));
        let games = client.list_events().await.expect("scoreboard");

        mock.assert_async().await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, "401");
        assert_eq!(games[0].display_name, "Georgia vs Alabama");
        assert_eq!(games[0].feed_href.as_deref(), Some("https://feed.example/401"));
    }

    #[tokio::test]
    async fn test_list_events_http_error_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/scoreboard")
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server, None).list_events().await.unwrap_err();
        assert!(matches!(err, FeedError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_list_events_invalid_json_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/scoreboard")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client_for(&server, None).list_events().await.unwrap_err();
        assert!(matches!(err, FeedError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_list_events_unreachable_host() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client =
            FeedClient::new("http://127.0.0.1:9/scoreboard", None, Duration::from_secs(2))
                .expect("client builds");
        let err = client.list_events().await.unwrap_err();
        assert!(matches!(err, FeedError::Request { .. }));
    }

    // ── latest_play ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_latest_play_parses_feed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/pbp/401")
            .with_status(200)
            .with_body(r#"{ "plays": [ { "text": "Pass to the 9", "yardLine": 9 } ] }"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let url = format!("{}/pbp/401", server.url());
        let state = client.latest_play(Some(&url)).await.expect("play");
        assert_eq!(state.description, "Pass to the 9");
        assert_eq!(state.field_position, Some(9));
    }

    #[tokio::test]
    async fn test_latest_play_malformed_body_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/pbp/bad")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let client = client_for(&server, None);
        let url = format!("{}/pbp/bad", server.url());
        let state = client.latest_play(Some(&url)).await.expect("never raises");
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_latest_play_missing_reference_is_empty() {
        let server = mockito::Server::new_async().await;
        let client = client_for(&server, None);
        assert!(client.latest_play(None).await.unwrap().is_empty());
        assert!(client.latest_play(Some("")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_play_http_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/pbp/gone")
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let url = format!("{}/pbp/gone", server.url());
        let err = client.latest_play(Some(&url)).await.unwrap_err();
        assert!(matches!(err, FeedError::Status { status: 404, .. }));
    }
}
