//! Feed, follow and post repositories for gator.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{
    Feed, FeedFollow, FeedWithOwner, FollowedFeed, InsertOutcome, NewFeed, NewPost, Post,
};
use crate::datetime::{parse_db_timestamp, to_db_timestamp};
use crate::db::DbPool;
use crate::{GatorError, Result};

const FEED_COLUMNS: &str =
    "f.id, f.name, f.url, f.user_id, f.last_fetched_at, f.created_at, f.updated_at";

const POST_COLUMNS: &str =
    "id, title, url, description, published_at, feed_id, created_at, updated_at";

/// Row type for a feed from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: Uuid,
    name: String,
    url: String,
    user_id: Uuid,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            user_id: row.user_id,
            last_fetched_at: row.last_fetched_at.and_then(|s| parse_db_timestamp(&s)),
            created_at: parse_db_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_db_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Row type for a feed joined with its owner.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedWithOwnerRow {
    #[sqlx(flatten)]
    feed: FeedRow,
    owner_name: String,
}

impl From<FeedWithOwnerRow> for FeedWithOwner {
    fn from(row: FeedWithOwnerRow) -> Self {
        FeedWithOwner {
            feed: row.feed.into(),
            owner_name: row.owner_name,
        }
    }
}

/// Row type for a follow joined with user and feed names.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FollowedFeedRow {
    id: Uuid,
    user_id: Uuid,
    feed_id: Uuid,
    created_at: String,
    updated_at: String,
    user_name: String,
    feed_name: String,
    feed_url: String,
}

impl From<FollowedFeedRow> for FollowedFeed {
    fn from(row: FollowedFeedRow) -> Self {
        FollowedFeed {
            follow: FeedFollow {
                id: row.id,
                user_id: row.user_id,
                feed_id: row.feed_id,
                created_at: parse_db_timestamp(&row.created_at).unwrap_or_else(Utc::now),
                updated_at: parse_db_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
            },
            user_name: row.user_name,
            feed_name: row.feed_name,
            feed_url: row.feed_url,
        }
    }
}

/// Row type for a post from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: Option<String>,
    url: String,
    description: Option<String>,
    published_at: Option<String>,
    feed_id: Uuid,
    created_at: String,
    updated_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            title: row.title,
            url: row.url,
            description: row.description,
            published_at: row.published_at.and_then(|s| parse_db_timestamp(&s)),
            feed_id: row.feed_id,
            created_at: parse_db_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_db_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

fn unique_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> GatorError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            GatorError::Validation(message())
        }
        other => GatorError::from(other),
    }
}

/// Repository for feed operations.
pub struct FeedRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new feed.
    ///
    /// Fails with a validation error if a feed with the same URL exists.
    pub async fn create(&self, feed: &NewFeed) -> Result<Feed> {
        let now = to_db_timestamp(&Utc::now());
        let row = sqlx::query_as::<_, FeedRow>(
            r#"
            INSERT INTO feeds (id, name, url, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, url, user_id, last_fetched_at, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&feed.name)
        .bind(&feed.url)
        .bind(feed.user_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| unique_violation(e, || format!("feed '{}' already exists", feed.url)))?;

        Ok(row.into())
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds f WHERE f.id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a feed by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds f WHERE f.url = ?"
        ))
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List all feeds with the name of the user who added each.
    pub async fn list_with_owner(&self) -> Result<Vec<FeedWithOwner>> {
        let rows = sqlx::query_as::<_, FeedWithOwnerRow>(&format!(
            r#"
            SELECT {FEED_COLUMNS}, u.name AS owner_name
            FROM feeds f
            JOIN users u ON u.id = f.user_id
            ORDER BY f.created_at, f.rowid
            "#
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get the feed that has waited longest for a fetch.
    ///
    /// Feeds never fetched come first, then the oldest `last_fetched_at`.
    /// Ties are broken by creation order. Returns `None` if there are no
    /// feeds.
    pub async fn next_to_fetch(&self) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            r#"
            SELECT {FEED_COLUMNS}
            FROM feeds f
            ORDER BY f.last_fetched_at ASC NULLS FIRST, f.created_at ASC, f.rowid ASC
            LIMIT 1
            "#
        ))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Record a fetch attempt at `now`.
    ///
    /// Returns false if the feed no longer exists.
    pub async fn mark_fetched(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let now = to_db_timestamp(&now);
        let result =
            sqlx::query("UPDATE feeds SET last_fetched_at = ?, updated_at = ? WHERE id = ?")
                .bind(&now)
                .bind(&now)
                .bind(id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all feeds.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feeds")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Repository for follow relations.
pub struct FeedFollowRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedFollowRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Make `user_id` follow `feed_id`.
    ///
    /// Fails with a validation error if the follow already exists.
    pub async fn create(&self, user_id: Uuid, feed_id: Uuid) -> Result<FollowedFeed> {
        let id = Uuid::new_v4();
        let now = to_db_timestamp(&Utc::now());
        sqlx::query(
            r#"
            INSERT INTO feed_follows (id, user_id, feed_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(feed_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .map_err(|e| unique_violation(e, || "already following this feed".to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| GatorError::NotFound("feed follow".to_string()))
    }

    /// Get a follow by ID.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<FollowedFeed>> {
        let row = sqlx::query_as::<_, FollowedFeedRow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id, ff.created_at, ff.updated_at,
                   u.name AS user_name, f.name AS feed_name, f.url AS feed_url
            FROM feed_follows ff
            JOIN users u ON u.id = ff.user_id
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List the feeds a user follows, in follow order.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FollowedFeed>> {
        let rows = sqlx::query_as::<_, FollowedFeedRow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id, ff.created_at, ff.updated_at,
                   u.name AS user_name, f.name AS feed_name, f.url AS feed_url
            FROM feed_follows ff
            JOIN users u ON u.id = ff.user_id
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.user_id = ?
            ORDER BY ff.created_at, ff.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Remove a user's follow of the feed at `url`.
    ///
    /// Returns false if the user did not follow it.
    pub async fn delete_by_url(&self, user_id: Uuid, url: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM feed_follows
            WHERE user_id = ? AND feed_id IN (SELECT id FROM feeds WHERE url = ?)
            "#,
        )
        .bind(user_id)
        .bind(url)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a post unless one with the same URL exists.
    ///
    /// A URL collision is reported as [`InsertOutcome::DuplicateUrl`]. Any
    /// other failure, such as a missing feed, is an error.
    pub async fn insert(&self, post: &NewPost) -> Result<InsertOutcome> {
        let now = to_db_timestamp(&Utc::now());
        let published_at = post.published_at.as_ref().map(to_db_timestamp);

        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts (id, title, url, description, published_at, feed_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(&published_at)
        .bind(post.feed_id)
        .bind(&now)
        .bind(&now)
        .fetch_optional(self.pool)
        .await?;

        Ok(match row {
            Some(row) => InsertOutcome::Inserted(row.into()),
            None => InsertOutcome::DuplicateUrl,
        })
    }

    /// Get a post by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE url = ?"
        ))
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List the newest posts from feeds a user follows.
    ///
    /// Posts without a publish date sort after all dated posts.
    pub async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.title, p.url, p.description, p.published_at, p.feed_id,
                   p.created_at, p.updated_at
            FROM posts p
            JOIN feed_follows ff ON ff.feed_id = p.feed_id
            WHERE ff.user_id = ?
            ORDER BY p.published_at IS NULL, p.published_at DESC, p.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count posts stored for a feed.
    pub async fn count_by_feed(&self, feed_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE feed_id = ?")
            .bind(feed_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
