//! SQL schema for the skein SQLite store.
//!
//! Executed at connection startup. Every statement is idempotent, so opening
//! an existing store is a no-op.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subreddits (
    id    TEXT PRIMARY KEY,
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS threads (
    id            TEXT PRIMARY KEY,
    subreddit_id  TEXT NOT NULL REFERENCES subreddits(id) ON DELETE CASCADE,
    title         TEXT NOT NULL,
    text          TEXT,
    external_url  TEXT,              -- link target; NULL for self posts
    url           TEXT NOT NULL,     -- canonical permalink
    username      TEXT,              -- NULL when the author is deleted
    upvotes       INTEGER NOT NULL,
    date_posted   TEXT NOT NULL      -- 'YYYY-MM-DD HH:MM:SS', local time
);

-- Comments arrive level by level, so a parent may be written after its
-- reply within one batch; the self-reference is checked at commit.
CREATE TABLE IF NOT EXISTS comments (
    id                 TEXT PRIMARY KEY,
    thread_id          TEXT NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
    parent_comment_id  TEXT REFERENCES comments(id) ON DELETE CASCADE
                         DEFERRABLE INITIALLY DEFERRED,
    username           TEXT,
    upvotes            INTEGER NOT NULL,
    date_posted        TEXT NOT NULL,
    text               TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS subreddits_name_idx   ON subreddits(name);
CREATE INDEX IF NOT EXISTS threads_listing_idx   ON threads(subreddit_id, date_posted);
CREATE INDEX IF NOT EXISTS comments_thread_idx   ON comments(thread_id, date_posted);

PRAGMA user_version = 1;
";
