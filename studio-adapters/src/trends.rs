//! Trend-topic sources and the resilient multi-platform scraper.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hyper::header::{ACCEPT, USER_AGENT as USER_AGENT_HEADER};
use hyper::{Body, Request, Uri};
use serde::Deserialize;
use studio_primitives::Platform;

use crate::http_client::{
    HyperClient, USER_AGENT, build_https_client, encode_query, execute, sanitize_base_url,
};
use crate::traits::{AdapterError, AdapterResult};

/// Trait implemented by per-platform topic sources.
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Platform this source answers for.
    fn platform(&self) -> Platform;

    /// Returns topic strings related to the niche, most relevant first.
    async fn fetch(&self, niche: &str) -> AdapterResult<Vec<String>>;
}

/// A platform whose source failed during a scrape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFailure {
    /// Platform that failed.
    pub platform: Platform,
    /// Rendered error.
    pub reason: String,
}

/// Outcome of a scrape: the merged topics plus every per-platform failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrendReport {
    /// Deduplicated topics in first-seen order.
    pub topics: Vec<String>,
    /// Platforms that contributed nothing because their source failed.
    pub failures: Vec<SourceFailure>,
}

/// Queries one source per requested platform and merges the results.
///
/// A failing or missing source is recorded in [`TrendReport::failures`] and the
/// scrape moves on to the next platform; a scrape never fails as a whole.
#[derive(Clone, Default)]
pub struct TrendScraper {
    sources: Vec<Arc<dyn TrendSource>>,
}

impl fmt::Debug for TrendScraper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let platforms: Vec<_> = self.sources.iter().map(|s| s.platform()).collect();
        f.debug_struct("TrendScraper")
            .field("platforms", &platforms)
            .finish()
    }
}

impl TrendScraper {
    /// Creates a scraper with no sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scraper wired to the public endpoints for every platform.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] when the HTTPS client cannot be built.
    pub fn standard(timeout: Duration) -> AdapterResult<Self> {
        let client = build_https_client()?;
        let mut scraper = Self::new()
            .with_source(Arc::new(SuggestTrendSource::youtube(client.clone(), timeout)))
            .with_source(Arc::new(SuggestTrendSource::google(client.clone(), timeout)))
            .with_source(Arc::new(RedditTrendSource::new(client, timeout)));
        for platform in [
            Platform::Tiktok,
            Platform::Instagram,
            Platform::Twitter,
            Platform::Linkedin,
        ] {
            scraper = scraper.with_source(Arc::new(HashtagTrendSource::new(platform)));
        }
        Ok(scraper)
    }

    /// Adds a source; the first source registered for a platform wins.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn TrendSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Scrapes every requested platform in order.
    pub async fn scrape(&self, niche: &str, platforms: &[Platform]) -> TrendReport {
        let mut report = TrendReport::default();
        let mut seen = HashSet::new();

        for platform in platforms {
            let Some(source) = self.sources.iter().find(|s| s.platform() == *platform) else {
                report.failures.push(SourceFailure {
                    platform: *platform,
                    reason: format!("no trend source registered for {platform}"),
                });
                continue;
            };

            match source.fetch(niche).await {
                Ok(topics) => {
                    for topic in topics {
                        let trimmed = topic.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        if seen.insert(trimmed.to_lowercase()) {
                            report.topics.push(trimmed.to_owned());
                        }
                    }
                }
                Err(err) => report.failures.push(SourceFailure {
                    platform: *platform,
                    reason: err.to_string(),
                }),
            }
        }

        report
    }
}

/// Autocomplete suggestions from Google web search or YouTube search.
pub struct SuggestTrendSource {
    client: HyperClient,
    base_url: String,
    platform: Platform,
    timeout: Duration,
}

impl fmt::Debug for SuggestTrendSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestTrendSource")
            .field("platform", &self.platform)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SuggestTrendSource {
    const DEFAULT_BASE: &'static str = "https://suggestqueries.google.com/";

    /// Google web-search suggestions.
    #[must_use]
    pub fn google(client: HyperClient, timeout: Duration) -> Self {
        Self {
            client,
            base_url: Self::DEFAULT_BASE.to_owned(),
            platform: Platform::Google,
            timeout,
        }
    }

    /// YouTube search suggestions.
    #[must_use]
    pub fn youtube(client: HyperClient, timeout: Duration) -> Self {
        Self {
            platform: Platform::Youtube,
            ..Self::google(client, timeout)
        }
    }

    /// Overrides the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref(), "suggest")?;
        Ok(self)
    }

    fn uri(&self, niche: &str) -> AdapterResult<Uri> {
        let dataset = if self.platform == Platform::Youtube {
            "&ds=yt"
        } else {
            ""
        };
        format!(
            "{}complete/search?client=firefox{dataset}&q={}",
            self.base_url,
            encode_query(niche)
        )
        .parse::<Uri>()
        .map_err(|err| AdapterError::invalid_request(format!("invalid suggest query: {err}")))
    }
}

#[async_trait]
impl TrendSource for SuggestTrendSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, niche: &str) -> AdapterResult<Vec<String>> {
        let req = Request::get(self.uri(niche)?)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(ACCEPT, "application/json")
            .body(Body::empty())
            .map_err(|err| AdapterError::transport(format!("failed to build request: {err}")))?;
        let bytes = execute(&self.client, req, self.timeout, "suggest").await?;
        parse_suggestions(&bytes)
    }
}

/// Hot Reddit posts matching the niche.
pub struct RedditTrendSource {
    client: HyperClient,
    base_url: String,
    timeout: Duration,
    limit: u8,
}

impl fmt::Debug for RedditTrendSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditTrendSource")
            .field("base_url", &self.base_url)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl RedditTrendSource {
    /// Creates a source against `www.reddit.com`.
    #[must_use]
    pub fn new(client: HyperClient, timeout: Duration) -> Self {
        Self {
            client,
            base_url: "https://www.reddit.com/".to_owned(),
            timeout,
            limit: 15,
        }
    }

    /// Overrides the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref(), "Reddit")?;
        Ok(self)
    }
}

#[async_trait]
impl TrendSource for RedditTrendSource {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch(&self, niche: &str) -> AdapterResult<Vec<String>> {
        let uri = format!(
            "{}search.json?q={}&sort=hot&t=week&limit={}",
            self.base_url,
            encode_query(niche),
            self.limit
        )
        .parse::<Uri>()
        .map_err(|err| AdapterError::invalid_request(format!("invalid Reddit query: {err}")))?;

        let req = Request::get(uri)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(ACCEPT, "application/json")
            .body(Body::empty())
            .map_err(|err| AdapterError::transport(format!("failed to build request: {err}")))?;
        let bytes = execute(&self.client, req, self.timeout, "Reddit").await?;
        parse_reddit_listing(&bytes)
    }
}

/// Derives hashtag-style topics for platforms without a public search endpoint.
#[derive(Clone, Copy, Debug)]
pub struct HashtagTrendSource {
    platform: Platform,
}

impl HashtagTrendSource {
    /// Creates a derived source for the platform.
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl TrendSource for HashtagTrendSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, niche: &str) -> AdapterResult<Vec<String>> {
        let niche = niche.trim();
        if niche.is_empty() {
            return Err(AdapterError::invalid_request("niche cannot be empty"));
        }
        let tag: String = niche
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect();

        let suffixes: &[&str] = match self.platform {
            Platform::Tiktok => &["challenge", "hacks", "storytime"],
            Platform::Instagram => &["reels", "aesthetic", "before and after"],
            Platform::Twitter => &["hot takes", "thread", "news"],
            Platform::Linkedin => &["lessons learned", "career", "industry trends"],
            _ => &["tips", "guide", "explained"],
        };

        let mut topics = vec![format!("#{tag}")];
        topics.extend(suffixes.iter().map(|suffix| format!("{niche} {suffix}")));
        Ok(topics)
    }
}

fn parse_suggestions(bytes: &[u8]) -> AdapterResult<Vec<String>> {
    let (_query, suggestions): (String, Vec<String>) = serde_json::from_slice(bytes)
        .or_else(|_| {
            serde_json::from_slice::<(String, Vec<String>, serde_json::Value)>(bytes)
                .map(|(query, suggestions, _)| (query, suggestions))
        })
        .map_err(|err| AdapterError::response(format!("unexpected suggest payload: {err}")))?;
    Ok(suggestions)
}

#[derive(Debug, Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Debug, Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    title: String,
}

fn parse_reddit_listing(bytes: &[u8]) -> AdapterResult<Vec<String>> {
    let listing: RedditListing = serde_json::from_slice(bytes)
        .map_err(|err| AdapterError::response(format!("unexpected Reddit payload: {err}")))?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| child.data.title)
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FixedSource {
        platform: Platform,
        result: Result<Vec<&'static str>, &'static str>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn ok(platform: Platform, topics: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                platform,
                result: Ok(topics),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(platform: Platform) -> Arc<Self> {
            Arc::new(Self {
                platform,
                result: Err("upstream unavailable"),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TrendSource for FixedSource {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn fetch(&self, _niche: &str) -> AdapterResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map(|topics| topics.into_iter().map(str::to_owned).collect())
                .map_err(AdapterError::transport)
        }
    }

    #[tokio::test]
    async fn one_failing_source_does_not_abort_the_scrape() {
        let youtube = FixedSource::ok(Platform::Youtube, vec!["espresso tamping", "latte art"]);
        let reddit = FixedSource::failing(Platform::Reddit);
        let google = FixedSource::ok(Platform::Google, vec!["Latte Art", "grinder settings"]);
        let scraper = TrendScraper::new()
            .with_source(youtube.clone())
            .with_source(reddit.clone())
            .with_source(google.clone());

        let report = scraper
            .scrape(
                "espresso",
                &[Platform::Youtube, Platform::Reddit, Platform::Google],
            )
            .await;

        assert_eq!(
            report.topics,
            vec!["espresso tamping", "latte art", "grinder settings"]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].platform, Platform::Reddit);
        assert!(report.failures[0].reason.contains("upstream unavailable"));
        assert_eq!(reddit.calls.load(Ordering::SeqCst), 1);
        assert_eq!(google.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_source_is_reported_not_raised() {
        let scraper = TrendScraper::new().with_source(FixedSource::ok(Platform::Youtube, vec!["a"]));
        let report = scraper
            .scrape("x", &[Platform::Tiktok, Platform::Youtube])
            .await;
        assert_eq!(report.topics, vec!["a"]);
        assert_eq!(report.failures[0].platform, Platform::Tiktok);
    }

    #[tokio::test]
    async fn blank_topics_are_skipped() {
        let scraper =
            TrendScraper::new().with_source(FixedSource::ok(Platform::Google, vec![" ", " b "]));
        let report = scraper.scrape("x", &[Platform::Google]).await;
        assert_eq!(report.topics, vec!["b"]);
    }

    #[tokio::test]
    async fn hashtag_source_derives_camel_case_tag() {
        let topics = HashtagTrendSource::new(Platform::Tiktok)
            .fetch("home espresso")
            .await
            .unwrap();
        assert_eq!(topics[0], "#HomeEspresso");
        assert!(topics.contains(&"home espresso challenge".to_owned()));
    }

    #[test]
    fn parses_suggest_payloads() {
        let simple = br#"["coffee",["coffee maker","coffee grinder"]]"#;
        assert_eq!(
            parse_suggestions(simple).unwrap(),
            vec!["coffee maker", "coffee grinder"]
        );
        let extended = br#"["coffee",["coffee beans"],{"google:suggesttype":[]}]"#;
        assert_eq!(parse_suggestions(extended).unwrap(), vec!["coffee beans"]);
        assert!(parse_suggestions(b"<html>").is_err());
    }

    #[test]
    fn parses_reddit_listing() {
        let body = br#"{"data":{"children":[{"data":{"title":"My first latte art"}},{"data":{"title":"Grinder upgrade"}}]}}"#;
        assert_eq!(
            parse_reddit_listing(body).unwrap(),
            vec!["My first latte art", "Grinder upgrade"]
        );
    }

    #[test]
    fn youtube_suggest_uses_yt_dataset() {
        let client = build_https_client().unwrap();
        let source = SuggestTrendSource::youtube(client, Duration::from_secs(1));
        let uri = source.uri("latte art").unwrap();
        assert_eq!(uri.query(), Some("client=firefox&ds=yt&q=latte+art"));
    }
}
