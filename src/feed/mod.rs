//! Feed module for gator.
//!
//! This module provides feed subscriptions, feed retrieval and the
//! ingestion loop that turns feed items into stored posts.

pub mod fetcher;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod types;
pub mod writer;

pub use fetcher::{parse_document, validate_url, FeedFetcher, FetchError};
pub use repository::{FeedFollowRepository, FeedRepository, PostRepository};
pub use scheduler::{run_ingestion_loop, FeedScheduler, TickReport};
pub use service::FeedService;
pub use types::{
    Feed, FeedFollow, FeedWithOwner, FollowedFeed, InsertOutcome, NewFeed, NewPost, ParsedFeed,
    ParsedItem, Post,
};
pub use writer::{candidate, IngestStats, PostWriter};
