//! Post writer.
//!
//! Turns parsed items into stored posts. Re-fetching an unchanged feed is
//! the normal case, so a URL that is already stored counts as a duplicate and
//! not as a failure.

use tracing::{debug, warn};
use uuid::Uuid;

use super::repository::PostRepository;
use super::types::{Feed, InsertOutcome, NewPost, ParsedItem};
use crate::datetime::normalize_pub_date;
use crate::db::DbPool;
use crate::{GatorError, Result};

/// Per-tick ingestion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Items in the fetched document.
    pub items: usize,
    /// Posts newly stored.
    pub created: usize,
    /// Items whose URL was already stored.
    pub duplicates: usize,
    /// Items that could not be stored.
    pub failed: usize,
}

/// Writes parsed items as posts.
pub struct PostWriter<'a> {
    posts: PostRepository<'a>,
}

impl<'a> PostWriter<'a> {
    /// Create a writer on the given pool.
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            posts: PostRepository::new(pool),
        }
    }

    /// Store one item for `feed_id`.
    pub async fn write(&self, item: &ParsedItem, feed_id: Uuid) -> Result<InsertOutcome> {
        let post = candidate(item, feed_id)?;
        self.posts.insert(&post).await
    }

    /// Store every item of a fetched feed.
    ///
    /// A failing item is logged and counted; the remaining items are still
    /// written.
    pub async fn write_all(&self, feed: &Feed, items: &[ParsedItem]) -> IngestStats {
        let mut stats = IngestStats {
            items: items.len(),
            ..Default::default()
        };

        for item in items {
            match self.write(item, feed.id).await {
                Ok(InsertOutcome::Inserted(post)) => {
                    debug!(feed = %feed.name, url = %post.url, "stored post");
                    stats.created += 1;
                }
                Ok(InsertOutcome::DuplicateUrl) => stats.duplicates += 1,
                Err(e) => {
                    warn!(feed = %feed.name, link = %item.link, "couldn't store post: {}", e);
                    stats.failed += 1;
                }
            }
        }

        stats
    }
}

/// Build a candidate post from a parsed item.
///
/// Empty title and description become `None`. An unreadable publish date
/// becomes `None` as well. An item without a link cannot be stored.
pub fn candidate(item: &ParsedItem, feed_id: Uuid) -> Result<NewPost> {
    let url = item.link.trim();
    if url.is_empty() {
        return Err(GatorError::Validation("item has no link".to_string()));
    }

    Ok(NewPost {
        id: Uuid::new_v4(),
        title: non_empty(&item.title),
        url: url.to_string(),
        description: non_empty(&item.description),
        published_at: normalize_pub_date(&item.pub_date),
        feed_id,
    })
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
