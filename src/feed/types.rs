//! Feed types for gator.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A subscribable remote feed, unique by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Feed ID.
    pub id: Uuid,
    /// Display name chosen by the user who added it.
    pub name: String,
    /// Feed URL.
    pub url: String,
    /// User who added the feed.
    pub user_id: Uuid,
    /// Last time a fetch was attempted. `None` if never.
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// When the feed was created.
    pub created_at: DateTime<Utc>,
    /// When the feed was last updated.
    pub updated_at: DateTime<Utc>,
}

/// New feed for creation.
#[derive(Debug, Clone)]
pub struct NewFeed {
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
}

impl NewFeed {
    /// Create a new feed owned by `user_id`.
    pub fn new(name: impl Into<String>, url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            user_id,
        }
    }
}

/// A feed together with the name of the user who added it.
#[derive(Debug, Clone)]
pub struct FeedWithOwner {
    pub feed: Feed,
    pub owner_name: String,
}

/// A follow relation between a user and a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFollow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub feed_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A follow relation joined with user and feed names.
#[derive(Debug, Clone)]
pub struct FollowedFeed {
    pub follow: FeedFollow,
    pub user_name: String,
    pub feed_name: String,
    pub feed_url: String,
}

/// A stored article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Post ID.
    pub id: Uuid,
    /// Title, absent if the feed gave none.
    pub title: Option<String>,
    /// Article URL (unique across all posts).
    pub url: String,
    /// Description, absent if the feed gave none.
    pub description: Option<String>,
    /// Publish time, absent if unknown or unreadable.
    pub published_at: Option<DateTime<Utc>>,
    /// Feed the post came from.
    pub feed_id: Uuid,
    /// When the post was stored.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Candidate post for insertion.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: Uuid,
    pub title: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub feed_id: Uuid,
}

/// Result of inserting a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The post was stored.
    Inserted(Post),
    /// A post with the same URL already exists; nothing was written.
    DuplicateUrl,
}

impl InsertOutcome {
    /// Check if the insert created a row.
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

/// Parsed feed document (from fetcher).
///
/// Text fields have HTML entities already decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    /// Channel title.
    pub title: String,
    /// Channel link.
    pub link: String,
    /// Channel description.
    pub description: String,
    /// Items in document order. May be empty.
    pub items: Vec<ParsedItem>,
}

/// Parsed feed item (from fetcher).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Publish date exactly as the document gave it.
    pub pub_date: String,
}
