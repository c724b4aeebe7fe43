//! Feed fetcher.
//!
//! Retrieves a feed over HTTP and decodes it into a [`ParsedFeed`]. RSS 2.0
//! documents are read with the `rss` crate so that `pubDate` arrives exactly
//! as published; anything else is handed to `feed-rs`.

use std::time::Duration;

use html_escape::decode_html_entities;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::types::{ParsedFeed, ParsedItem};
use crate::config::ScraperConfig;
use crate::{GatorError, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Failure to retrieve or decode a feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be built (bad URL or unsupported scheme).
    #[error("invalid request for {url}: {reason}")]
    Request { url: String, reason: String },

    /// DNS, connect, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The body exceeds the configured size limit.
    #[error("feed too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    /// The body is neither RSS nor Atom/JSON Feed.
    #[error("failed to decode feed: {0}")]
    Decode(String),
}

/// HTTP feed fetcher.
///
/// The client is built once; every request carries the configured
/// User-Agent and is bounded by the configured timeouts.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: Client,
    max_size: u64,
}

impl FeedFetcher {
    /// Create a fetcher from the scraper configuration.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GatorError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_size: config.max_feed_size_bytes,
        })
    }

    /// Fetch and decode the feed at `url`.
    ///
    /// Nothing is retried here; a failed feed is simply picked up again on a
    /// later tick.
    pub async fn fetch(&self, url: &str) -> std::result::Result<ParsedFeed, FetchError> {
        validate_url(url)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_builder() {
                FetchError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            } else {
                FetchError::Transport(e)
            }
        })?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size {
                return Err(FetchError::TooLarge {
                    size: content_length,
                    max: self.max_size,
                });
            }
        }

        let bytes = response.bytes().await.map_err(FetchError::Transport)?;

        if bytes.len() as u64 > self.max_size {
            return Err(FetchError::TooLarge {
                size: bytes.len() as u64,
                max: self.max_size,
            });
        }

        parse_document(&bytes)
    }
}

/// Check that `url` is an absolute http(s) URL.
pub fn validate_url(url: &str) -> std::result::Result<(), FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::Request {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(FetchError::Request {
            url: url.to_string(),
            reason: format!("unsupported URL scheme: {scheme}"),
        }),
    }
}

/// Decode a feed document.
///
/// Text fields come back with HTML entities decoded once. A document with
/// no items is valid.
pub fn parse_document(bytes: &[u8]) -> std::result::Result<ParsedFeed, FetchError> {
    let feed = match rss::Channel::read_from(bytes) {
        Ok(channel) => from_rss(&channel),
        Err(rss_err) => match feed_rs::parser::parse(bytes) {
            Ok(feed) => from_feed_rs(feed),
            Err(_) => return Err(FetchError::Decode(rss_err.to_string())),
        },
    };

    Ok(unescape(feed))
}

fn from_rss(channel: &rss::Channel) -> ParsedFeed {
    let items = channel
        .items()
        .iter()
        .map(|item| ParsedItem {
            title: item.title().unwrap_or_default().to_string(),
            link: item.link().unwrap_or_default().to_string(),
            description: item.description().unwrap_or_default().to_string(),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
        })
        .collect();

    ParsedFeed {
        title: channel.title().to_string(),
        link: channel.link().to_string(),
        description: channel.description().to_string(),
        items,
    }
}

fn from_feed_rs(feed: feed_rs::model::Feed) -> ParsedFeed {
    let items = feed
        .entries
        .into_iter()
        .map(|entry| ParsedItem {
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            link: entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default(),
            description: entry
                .summary
                .map(|t| t.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default(),
            pub_date: entry
                .published
                .or(entry.updated)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default(),
        })
        .collect();

    ParsedFeed {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
        link: feed
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
        description: feed.description.map(|d| d.content).unwrap_or_default(),
        items,
    }
}

fn unescape(mut feed: ParsedFeed) -> ParsedFeed {
    feed.title = decode_html_entities(&feed.title).into_owned();
    feed.description = decode_html_entities(&feed.description).into_owned();
    for item in &mut feed.items {
        item.title = decode_html_entities(&item.title).into_owned();
        item.description = decode_html_entities(&item.description).into_owned();
    }
    feed
}
