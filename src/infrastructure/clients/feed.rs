use crate::domain::{RoundId, TournamentPost};
use bytes::Bytes;
use crate::error::{ArcadeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

pub const DEFAULT_FEED_URL: &str = "https://hrynehrajeme.cz/wp-json/wp/v2/posts/";

static ROUND_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^hrynehrajeme-arcade-turnaj-(\d+)$").unwrap());

#[derive(Debug, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// A post object as returned by the WordPress REST API.
#[derive(Debug, Deserialize)]
pub struct WpPost {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
}

impl WpPost {
    fn into_tournament_post(self) -> Option<TournamentPost> {
        let round = ROUND_SLUG
            .captures(&self.slug)
            .and_then(|caps| caps.get(1))
            .map(|digits| RoundId::new(digits.as_str()))?;

        Some(TournamentPost {
            round,
            slug: self.slug,
            title: self.title.rendered,
            content_html: self.content.rendered,
        })
    }
}

pub fn parse_feed(body: &str) -> Result<Vec<WpPost>> {
    Ok(serde_json::from_str(body)?)
}

/// Tournament rounds keyed by round id. A later post with the same id
/// replaces an earlier one.
pub fn select_rounds(posts: Vec<WpPost>) -> BTreeMap<RoundId, TournamentPost> {
    let mut rounds = BTreeMap::new();
    for post in posts.into_iter().filter_map(WpPost::into_tournament_post) {
        rounds.insert(post.round.clone(), post);
    }
    rounds
}

/// The numerically largest round; ties keep the first one seen.
pub fn select_newest(posts: Vec<WpPost>) -> Option<TournamentPost> {
    let mut newest: Option<TournamentPost> = None;
    for post in posts.into_iter().filter_map(WpPost::into_tournament_post) {
        let is_newer = newest
            .as_ref()
            .map_or(true, |current| post.round.numeric_cmp(&current.round).is_gt());
        if is_newer {
            newest = Some(post);
        }
    }
    newest
}

pub struct FeedClient {
    client: Client,
    feed_url: String,
}

impl FeedClient {
    pub fn new(client: Client, feed_url: impl Into<String>) -> Self {
        Self {
            client,
            feed_url: feed_url.into(),
        }
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    #[instrument(skip(self), fields(url = %self.feed_url))]
    pub async fn list_tournament_posts(&self) -> Result<BTreeMap<RoundId, TournamentPost>> {
        let posts = self.fetch_posts().await?;
        let rounds = select_rounds(posts);
        info!("Found {} tournament rounds", rounds.len());
        Ok(rounds)
    }

    #[instrument(skip(self), fields(url = %self.feed_url))]
    pub async fn find_newest_round(&self) -> Result<Option<TournamentPost>> {
        let posts = self.fetch_posts().await?;
        Ok(select_newest(posts))
    }

    /// Downloads a replay archive into memory.
    #[instrument(skip(self))]
    pub async fn fetch_replay_bundle(&self, url: &str) -> Result<Bytes> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await?;
        info!("Downloaded replay bundle ({} bytes)", bytes.len());
        Ok(bytes)
    }

    async fn fetch_posts(&self) -> Result<Vec<WpPost>> {
        let response = self.get(&self.feed_url).await?;
        let body = response.text().await?;
        let posts = parse_feed(&body)?;
        debug!(posts = posts.len(), "parsed feed");
        Ok(posts)
    }

    async fn get(&self, url: &str) -> Result<Response> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArcadeError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn post(slug: &str, content: &str) -> serde_json::Value {
        serde_json::json!({
            "slug": slug,
            "title": { "rendered": slug },
            "content": { "rendered": content },
        })
    }

    fn posts(slugs: &[&str]) -> Vec<WpPost> {
        let feed: Vec<_> = slugs.iter().map(|s| post(s, "")).collect();
        parse_feed(&serde_json::to_string(&feed).unwrap()).unwrap()
    }

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    /// Serves exactly one canned HTTP response and returns the base URL.
    async fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/")
    }

    #[test]
    fn rounds_are_keyed_by_captured_digits() {
        let rounds = select_rounds(posts(&[
            "hrynehrajeme-arcade-turnaj-12",
            "hrynehrajeme-arcade-turnaj-007",
            "hrynehrajeme-arcade-turnaj-12-vysledky",
            "pozvanka-na-turnaj",
        ]));

        let keys: Vec<&str> = rounds.keys().map(RoundId::as_str).collect();
        assert_eq!(keys, vec!["007", "12"]);
        assert_eq!(rounds[&RoundId::new("12")].slug, "hrynehrajeme-arcade-turnaj-12");
    }

    #[test]
    fn missing_slug_never_matches() {
        let posts = parse_feed(r#"[{"content": {"rendered": "<h3>ROM: x</h3>"}}]"#).unwrap();
        assert!(select_rounds(posts).is_empty());
    }

    #[test]
    fn newest_round_is_numeric_maximum() {
        let newest = select_newest(posts(&[
            "hrynehrajeme-arcade-turnaj-2",
            "hrynehrajeme-arcade-turnaj-10",
            "hrynehrajeme-arcade-turnaj-9",
        ]))
        .unwrap();
        assert_eq!(newest.round.as_str(), "10");
    }

    #[test]
    fn newest_round_tie_keeps_first_seen() {
        let newest = select_newest(posts(&[
            "hrynehrajeme-arcade-turnaj-010",
            "hrynehrajeme-arcade-turnaj-10",
        ]))
        .unwrap();
        assert_eq!(newest.round.as_str(), "010");
    }

    #[test]
    fn no_matching_post_means_no_newest() {
        assert!(select_newest(posts(&["something-else"])).is_none());
    }

    #[test]
    fn non_array_feed_is_a_format_error() {
        let err = parse_feed(r#"{"code": "rest_no_route"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        let err = parse_feed("<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[tokio::test]
    async fn list_tournament_posts_over_http() {
        let feed = serde_json::to_vec(&vec![
            post("hrynehrajeme-arcade-turnaj-3", "<h3>ROM: pacman</h3>"),
            post("novinky", ""),
        ])
        .unwrap();
        let url = serve_once("200 OK", feed).await;

        let client = FeedClient::new(local_client(), url);
        let rounds = client.list_tournament_posts().await.unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(
            rounds[&RoundId::new("3")].content_html,
            "<h3>ROM: pacman</h3>"
        );
    }

    #[tokio::test]
    async fn error_status_is_a_network_error() {
        let url = serve_once("500 Internal Server Error", b"nope".to_vec()).await;
        let client = FeedClient::new(local_client(), url);
        let err = client.find_newest_round().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn replay_bundle_is_returned_verbatim() {
        let bundle = vec![0x50, 0x4b, 0x03, 0x04, 0xff];
        let url = serve_once("200 OK", bundle.clone()).await;
        let client = FeedClient::new(local_client(), "unused");
        let bytes = client.fetch_replay_bundle(&url).await.unwrap();
        assert_eq!(&bytes[..], &bundle[..]);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = FeedClient::new(local_client(), "unused");
        let err = client
            .fetch_replay_bundle(&format!("http://{addr}/r.zip"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
