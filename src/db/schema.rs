//! Database schema and migrations for gator.
//!
//! Migrations are applied in order when the database is opened. The
//! `schema_version` table records which ones have run.

/// Database migrations.
///
/// Each entry is a SQL script. Identifiers are UUIDs stored as 16-byte blobs
/// and timestamps are fixed-width RFC 3339 strings in UTC.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id          BLOB PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
"#,
    // v2: feeds
    r#"
CREATE TABLE feeds (
    id               BLOB PRIMARY KEY,
    name             TEXT NOT NULL,
    url              TEXT NOT NULL UNIQUE,
    user_id          BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    last_fetched_at  TEXT,                  -- NULL until the first fetch attempt
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX idx_feeds_last_fetched_at ON feeds(last_fetched_at);
CREATE INDEX idx_feeds_user_id ON feeds(user_id);
"#,
    // v3: feed_follows
    r#"
CREATE TABLE feed_follows (
    id          BLOB PRIMARY KEY,
    user_id     BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    feed_id     BLOB NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE(user_id, feed_id)
);

CREATE INDEX idx_feed_follows_feed_id ON feed_follows(feed_id);
"#,
    // v4: posts
    r#"
CREATE TABLE posts (
    id            BLOB PRIMARY KEY,
    title         TEXT,
    url           TEXT NOT NULL UNIQUE,
    description   TEXT,
    published_at  TEXT,                     -- NULL when the feed date was unreadable
    feed_id       BLOB NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX idx_posts_feed_id ON posts(feed_id);
CREATE INDEX idx_posts_published_at ON posts(published_at);
"#,
];
