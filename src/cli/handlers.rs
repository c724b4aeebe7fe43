//! Command handlers.
//!
//! Each handler writes its listing to `out`; logs go to stderr.

use std::future::Future;
use std::io::Write;

use tracing::info;

use super::State;
use crate::config::parse_interval;
use crate::datetime::format_utc_datetime;
use crate::db::{NewUser, UserRepository};
use crate::feed::{run_ingestion_loop, FeedService};
use crate::{GatorError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

pub async fn register<W: Write>(state: &mut State, name: &str, out: &mut W) -> Result<()> {
    let user = UserRepository::new(state.db.pool())
        .create(&NewUser::new(name))
        .await?;
    state.set_current_user(&user.name)?;

    info!("Registered user {} ({})", user.name, user.id);
    writeln!(out, "User {} created", user.name)?;
    Ok(())
}

pub async fn login<W: Write>(state: &mut State, name: &str, out: &mut W) -> Result<()> {
    let user = UserRepository::new(state.db.pool())
        .get_by_name(name.trim())
        .await?
        .ok_or_else(|| GatorError::NotFound(format!("user '{}'", name.trim())))?;
    state.set_current_user(&user.name)?;

    writeln!(out, "Logged in as {}", user.name)?;
    Ok(())
}

pub async fn users<W: Write>(state: &State, out: &mut W) -> Result<()> {
    let current = state.config.session.current_user.as_deref();
    for user in UserRepository::new(state.db.pool()).list().await? {
        if Some(user.name.as_str()) == current {
            writeln!(out, "* {} (current)", user.name)?;
        } else {
            writeln!(out, "* {}", user.name)?;
        }
    }
    Ok(())
}

pub async fn reset<W: Write>(state: &State, out: &mut W) -> Result<()> {
    let removed = UserRepository::new(state.db.pool()).delete_all().await?;
    info!("Reset database: {} user(s) removed", removed);
    writeln!(out, "Database reset")?;
    Ok(())
}

pub async fn add_feed<W: Write>(state: &State, name: &str, url: &str, out: &mut W) -> Result<()> {
    let user = state.current_user().await?;
    let (feed, _) = FeedService::new(&state.db).add_feed(&user, name, url).await?;

    writeln!(out, "Feed added: {}", feed.name)?;
    writeln!(out, "  URL:     {}", feed.url)?;
    writeln!(out, "  ID:      {}", feed.id)?;
    writeln!(out, "{} now follows {}", user.name, feed.name)?;
    Ok(())
}

pub async fn feeds<W: Write>(state: &State, out: &mut W) -> Result<()> {
    let feeds = FeedService::new(&state.db).list_feeds().await?;
    if feeds.is_empty() {
        writeln!(out, "No feeds yet")?;
        return Ok(());
    }
    for entry in feeds {
        writeln!(out, "* {}", entry.feed.name)?;
        writeln!(out, "  URL:      {}", entry.feed.url)?;
        writeln!(out, "  Added by: {}", entry.owner_name)?;
    }
    Ok(())
}

pub async fn follow<W: Write>(state: &State, url: &str, out: &mut W) -> Result<()> {
    let user = state.current_user().await?;
    let follow = FeedService::new(&state.db).follow(&user, url).await?;
    writeln!(out, "{} now follows {}", follow.user_name, follow.feed_name)?;
    Ok(())
}

pub async fn following<W: Write>(state: &State, out: &mut W) -> Result<()> {
    let user = state.current_user().await?;
    let follows = FeedService::new(&state.db).following(&user).await?;
    if follows.is_empty() {
        writeln!(out, "{} follows no feeds", user.name)?;
        return Ok(());
    }
    for follow in follows {
        writeln!(out, "* {}", follow.feed_name)?;
    }
    Ok(())
}

pub async fn unfollow<W: Write>(state: &State, url: &str, out: &mut W) -> Result<()> {
    let user = state.current_user().await?;
    FeedService::new(&state.db).unfollow(&user, url).await?;
    writeln!(out, "{} unfollowed {}", user.name, url.trim())?;
    Ok(())
}

pub async fn browse<W: Write>(state: &State, limit: Option<i64>, out: &mut W) -> Result<()> {
    let user = state.current_user().await?;
    let limit = limit.unwrap_or(state.config.display.browse_limit);
    let posts = FeedService::new(&state.db).browse(&user, limit).await?;

    if posts.is_empty() {
        writeln!(out, "No posts yet; run `gator agg` to collect some")?;
        return Ok(());
    }

    let timezone = &state.config.display.timezone;
    for post in posts {
        let published = post
            .published_at
            .map(|dt| format_utc_datetime(&dt, timezone, DATE_FORMAT))
            .unwrap_or_else(|| "unknown date".to_string());
        writeln!(out, "{}", post.title.as_deref().unwrap_or("(untitled)"))?;
        writeln!(out, "  {published}")?;
        writeln!(out, "  {}", post.url)?;
        if let Some(description) = post.description {
            writeln!(out, "  {description}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Collect feeds every `interval` until `shutdown` completes.
///
/// Falls back to the configured interval when none is given.
pub async fn agg<W, F>(state: &State, interval: Option<&str>, out: &mut W, shutdown: F) -> Result<()>
where
    W: Write,
    F: Future<Output = ()>,
{
    let interval = match interval {
        Some(raw) => parse_interval(raw)?,
        None => state.config.scraper.interval()?,
    };

    writeln!(out, "Collecting feeds every {interval:?}")?;
    out.flush()?;

    run_ingestion_loop(state.db.clone(), &state.config.scraper, interval, shutdown).await
}
