//! Feed service for gator.
//!
//! High-level feed operations used by the command line: adding feeds,
//! following and unfollowing them, and browsing collected posts.

use super::fetcher::validate_url;
use super::repository::{FeedFollowRepository, FeedRepository, PostRepository};
use super::types::{Feed, FeedWithOwner, FollowedFeed, NewFeed, Post};
use crate::db::{Database, User};
use crate::{GatorError, Result};

/// Service for feed operations.
pub struct FeedService<'a> {
    db: &'a Database,
}

impl<'a> FeedService<'a> {
    /// Create a new FeedService with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add a feed owned by `user` and follow it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is empty
    /// - The URL is not an http(s) URL
    /// - A feed with this URL already exists
    pub async fn add_feed(&self, user: &User, name: &str, url: &str) -> Result<(Feed, FollowedFeed)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatorError::Validation("feed name must not be empty".to_string()));
        }
        let url = url.trim();
        validate_url(url).map_err(|e| GatorError::Validation(e.to_string()))?;

        let feed = FeedRepository::new(self.db.pool())
            .create(&NewFeed::new(name, url, user.id))
            .await?;
        let follow = FeedFollowRepository::new(self.db.pool())
            .create(user.id, feed.id)
            .await?;

        Ok((feed, follow))
    }

    /// List all feeds with their owners.
    pub async fn list_feeds(&self) -> Result<Vec<FeedWithOwner>> {
        FeedRepository::new(self.db.pool()).list_with_owner().await
    }

    /// Follow the feed at `url`.
    pub async fn follow(&self, user: &User, url: &str) -> Result<FollowedFeed> {
        let feed = FeedRepository::new(self.db.pool())
            .get_by_url(url.trim())
            .await?
            .ok_or_else(|| GatorError::NotFound(format!("feed '{}'", url.trim())))?;

        FeedFollowRepository::new(self.db.pool())
            .create(user.id, feed.id)
            .await
    }

    /// Stop following the feed at `url`.
    pub async fn unfollow(&self, user: &User, url: &str) -> Result<()> {
        let removed = FeedFollowRepository::new(self.db.pool())
            .delete_by_url(user.id, url.trim())
            .await?;
        if !removed {
            return Err(GatorError::NotFound(format!(
                "follow of '{}' by '{}'",
                url.trim(),
                user.name
            )));
        }
        Ok(())
    }

    /// List the feeds `user` follows.
    pub async fn following(&self, user: &User) -> Result<Vec<FollowedFeed>> {
        FeedFollowRepository::new(self.db.pool())
            .list_for_user(user.id)
            .await
    }

    /// Newest posts from the feeds `user` follows.
    pub async fn browse(&self, user: &User, limit: i64) -> Result<Vec<Post>> {
        if limit <= 0 {
            return Err(GatorError::Validation(format!(
                "limit must be positive, got {limit}"
            )));
        }
        PostRepository::new(self.db.pool())
            .list_for_user(user.id, limit)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::feed::types::{InsertOutcome, NewPost};
    use uuid::Uuid;

    async fn setup() -> (Database, User) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("kahya"))
            .await
            .unwrap();
        (db, user)
    }

    #[tokio::test]
    async fn test_add_feed_follows_it() {
        let (db, user) = setup().await;
        let service = FeedService::new(&db);

        let (feed, follow) = service
            .add_feed(&user, "Hacker News", "https://news.ycombinator.com/rss")
            .await
            .unwrap();
        assert_eq!(feed.user_id, user.id);
        assert_eq!(follow.follow.feed_id, feed.id);

        let following = service.following(&user).await.unwrap();
        assert_eq!(following.len(), 1);
        assert_eq!(following[0].feed_name, "Hacker News");
    }

    #[tokio::test]
    async fn test_add_feed_validation() {
        let (db, user) = setup().await;
        let service = FeedService::new(&db);

        assert!(matches!(
            service.add_feed(&user, " ", "https://a.example/rss").await,
            Err(GatorError::Validation(_))
        ));
        assert!(matches!(
            service.add_feed(&user, "A", "a.example/rss").await,
            Err(GatorError::Validation(_))
        ));

        service
            .add_feed(&user, "A", "https://a.example/rss")
            .await
            .unwrap();
        assert!(matches!(
            service.add_feed(&user, "B", "https://a.example/rss").await,
            Err(GatorError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_follow_and_unfollow() {
        let (db, owner) = setup().await;
        let other = UserRepository::new(db.pool())
            .create(&NewUser::new("lane"))
            .await
            .unwrap();
        let service = FeedService::new(&db);
        service
            .add_feed(&owner, "A", "https://a.example/rss")
            .await
            .unwrap();

        let follow = service.follow(&other, "https://a.example/rss").await.unwrap();
        assert_eq!(follow.user_name, "lane");

        service.unfollow(&other, "https://a.example/rss").await.unwrap();
        assert!(service.following(&other).await.unwrap().is_empty());
        assert!(matches!(
            service.unfollow(&other, "https://a.example/rss").await,
            Err(GatorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_follow_unknown_feed() {
        let (db, user) = setup().await;
        let service = FeedService::new(&db);
        let result = service.follow(&user, "https://missing.example/rss").await;
        assert!(matches!(result, Err(GatorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_browse() {
        let (db, user) = setup().await;
        let service = FeedService::new(&db);
        let (feed, _) = service
            .add_feed(&user, "A", "https://a.example/rss")
            .await
            .unwrap();

        let post = NewPost {
            id: Uuid::new_v4(),
            title: Some("Hello".to_string()),
            url: "https://a.example/hello".to_string(),
            description: None,
            published_at: None,
            feed_id: feed.id,
        };
        let outcome = PostRepository::new(db.pool()).insert(&post).await.unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted(_)));

        let posts = service.browse(&user, 2).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title.as_deref(), Some("Hello"));

        assert!(service.browse(&user, 0).await.is_err());
    }
}
