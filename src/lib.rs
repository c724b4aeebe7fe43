//! gator - a personal RSS feed aggregator.
//!
//! Users follow feeds from the command line; a background loop fetches one
//! feed per tick and stores each new article exactly once.

pub mod cli;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod feed;
pub mod logging;

pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{GatorError, Result};
pub use feed::{
    run_ingestion_loop, FeedFetcher, FeedScheduler, FeedService, FetchError, IngestStats,
    InsertOutcome, TickReport,
};
