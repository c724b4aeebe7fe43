//! Feed ingestion scheduler.
//!
//! One tick refreshes one feed: the one that has waited longest. The feed is
//! marked as fetched before the request goes out, so a feed that always
//! fails still moves to the back of the queue. Ticks never overlap.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::fetcher::{FeedFetcher, FetchError};
use super::repository::FeedRepository;
use super::types::Feed;
use super::writer::{IngestStats, PostWriter};
use crate::config::ScraperConfig;
use crate::db::Database;
use crate::{GatorError, Result};

/// What a single tick did.
#[derive(Debug)]
pub enum TickReport {
    /// There were no feeds to fetch.
    Idle,
    /// The feed could not be retrieved or decoded.
    FetchFailed { feed: Feed, error: FetchError },
    /// The feed was fetched and its items written.
    Ingested { feed: Feed, stats: IngestStats },
}

impl TickReport {
    /// The feed this tick worked on, if any.
    pub fn feed(&self) -> Option<&Feed> {
        match self {
            TickReport::Idle => None,
            TickReport::FetchFailed { feed, .. } | TickReport::Ingested { feed, .. } => Some(feed),
        }
    }
}

/// Periodic feed scheduler.
pub struct FeedScheduler {
    db: Arc<Database>,
    fetcher: FeedFetcher,
}

impl FeedScheduler {
    /// Create a scheduler over `db` using `fetcher` for retrieval.
    pub fn new(db: Arc<Database>, fetcher: FeedFetcher) -> Self {
        Self { db, fetcher }
    }

    /// Run one tick.
    ///
    /// Returns an error only when the store cannot be read or updated.
    /// Fetch failures and item failures are part of the report.
    pub async fn tick(&self) -> Result<TickReport> {
        let feeds = FeedRepository::new(self.db.pool());

        let Some(mut feed) = feeds.next_to_fetch().await? else {
            debug!("No feeds to fetch");
            return Ok(TickReport::Idle);
        };

        let now = Utc::now();
        feeds.mark_fetched(feed.id, now).await?;
        feed.last_fetched_at = Some(now);

        debug!("Fetching feed {} ({})", feed.name, feed.url);

        let parsed = match self.fetcher.fetch(&feed.url).await {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!("Failed to fetch feed {} ({}): {}", feed.name, feed.url, error);
                return Ok(TickReport::FetchFailed { feed, error });
            }
        };

        let stats = PostWriter::new(self.db.pool())
            .write_all(&feed, &parsed.items)
            .await;

        info!(
            "Feed {} collected: {} item(s), {} new, {} duplicate, {} failed",
            feed.name, stats.items, stats.created, stats.duplicates, stats.failed
        );

        Ok(TickReport::Ingested { feed, stats })
    }

    /// Run exactly `n` ticks back to back.
    pub async fn run_ticks(&self, n: usize) -> Result<Vec<TickReport>> {
        let mut reports = Vec::with_capacity(n);
        for _ in 0..n {
            reports.push(self.tick().await?);
        }
        Ok(reports)
    }

    /// Tick every `interval` until `shutdown` completes.
    ///
    /// The first tick runs immediately. Shutdown is only observed between
    /// ticks; a tick in progress always finishes. Returns the first store
    /// error encountered.
    pub async fn run_until<F>(&self, interval: Duration, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if interval.is_zero() {
            return Err(GatorError::Config(
                "ingestion interval must be positive".to_string(),
            ));
        }

        info!("Collecting feeds every {:?}", interval);

        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Ingestion loop stopped");
                    return Ok(());
                }
                _ = timer.tick() => {
                    if let Err(e) = self.tick().await {
                        error!("Ingestion loop aborted: {}", e);
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Tick every `interval` until a store error occurs.
    pub async fn run(&self, interval: Duration) -> Result<()> {
        self.run_until(interval, std::future::pending()).await
    }
}

/// Run the ingestion loop over `db` until `shutdown` completes or a store
/// error occurs.
pub async fn run_ingestion_loop<F>(
    db: Arc<Database>,
    config: &ScraperConfig,
    interval: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let fetcher = FeedFetcher::new(config)?;
    FeedScheduler::new(db, fetcher)
        .run_until(interval, shutdown)
        .await
}
