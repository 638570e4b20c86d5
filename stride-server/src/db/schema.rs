/// SQL schema for the Stride database
/// Creates all tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    avatar_url TEXT,
    created_at TEXT NOT NULL
);

-- Runs table (immutable activity records)
CREATE TABLE IF NOT EXISTS runs (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    distance_meters REAL NOT NULL CHECK(distance_meters >= 0),
    duration_seconds INTEGER NOT NULL CHECK(duration_seconds >= 0),
    pace_seconds_per_km REAL NOT NULL,
    route TEXT,
    started_at TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_runs_user_id ON runs(user_id);

-- Posts table
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    author_id TEXT NOT NULL,
    run_id TEXT UNIQUE,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'visible' CHECK(status IN ('visible', 'hidden')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (run_id) REFERENCES runs(id) ON DELETE SET NULL
);

-- Feed ordering index, restricted to rows that can ever be listed
CREATE INDEX IF NOT EXISTS idx_posts_listed_created_at
    ON posts(created_at DESC, id DESC)
    WHERE status = 'visible' AND deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS idx_posts_author_id ON posts(author_id);

-- Comments table
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    post_id TEXT NOT NULL,
    author_id TEXT NOT NULL,
    parent_comment_id TEXT,
    content TEXT NOT NULL CHECK(length(trim(content)) > 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT,
    FOREIGN KEY (post_id) REFERENCES posts(id),
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (parent_comment_id) REFERENCES comments(id)
);

CREATE INDEX IF NOT EXISTS idx_comments_post_created_at ON comments(post_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_comments_parent_id ON comments(parent_comment_id);

-- Reactions table. Exactly one of post_id / comment_id is set.
CREATE TABLE IF NOT EXISTS reactions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    post_id TEXT,
    comment_id TEXT,
    type TEXT NOT NULL CHECK(type IN ('like', 'funny', 'insightful', 'fire')),
    created_at TEXT NOT NULL,
    CHECK((post_id IS NULL) <> (comment_id IS NULL)),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
    FOREIGN KEY (comment_id) REFERENCES comments(id) ON DELETE CASCADE
);

-- One reaction per (user, target, type)
CREATE UNIQUE INDEX IF NOT EXISTS idx_reactions_unique_post
    ON reactions(user_id, post_id, type) WHERE post_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_reactions_unique_comment
    ON reactions(user_id, comment_id, type) WHERE comment_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_reactions_post_created_at ON reactions(post_id, created_at);
CREATE INDEX IF NOT EXISTS idx_reactions_comment_id ON reactions(comment_id);

-- Follows table (one-way relationships)
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL,
    following_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (follower_id, following_id),
    FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (following_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_follows_following ON follows(following_id);
"#;

/// Demo data for local development
/// - 4 runners (alice, bob, charlie, diana)
/// - Posts with and without attached runs, one hidden and one deleted
/// - Comments with a reply thread
/// - Reactions on posts and comments, and a small follow graph
pub const DEMO_DATA: &str = r#"
INSERT OR IGNORE INTO users (id, username, avatar_url, created_at) VALUES
    ('018d0000-0000-7000-8000-000000000001', 'alice', 'https://avatars.stride.run/alice.png', '2024-01-01T00:00:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000002', 'bob', NULL, '2024-01-02T00:00:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000003', 'charlie', 'https://avatars.stride.run/charlie.png', '2024-01-03T00:00:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000004', 'diana', NULL, '2024-01-04T00:00:00.000000Z');

INSERT OR IGNORE INTO runs (id, user_id, distance_meters, duration_seconds, pace_seconds_per_km, route, started_at, created_at) VALUES
    ('018d0000-0000-7000-8000-000000000101', '018d0000-0000-7000-8000-000000000001', 10000.0, 2880, 288.0, NULL, '2024-01-10T06:00:00.000000Z', '2024-01-10T07:00:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000102', '018d0000-0000-7000-8000-000000000002', 5000.0, 1650, 330.0, NULL, '2024-01-10T17:30:00.000000Z', '2024-01-10T18:00:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000103', '018d0000-0000-7000-8000-000000000003', 21097.5, 6300, 298.6, NULL, '2024-01-11T08:00:00.000000Z', '2024-01-11T10:00:00.000000Z');

INSERT OR IGNORE INTO posts (id, author_id, run_id, title, content, status, created_at, updated_at, deleted_at) VALUES
    ('018d0000-0000-7000-8000-000000000201', '018d0000-0000-7000-8000-000000000001', '018d0000-0000-7000-8000-000000000101', 'Sunrise 10k', 'Negative split on the river loop.', 'visible', '2024-01-10T07:05:00.000000Z', '2024-01-10T07:05:00.000000Z', NULL),
    ('018d0000-0000-7000-8000-000000000202', '018d0000-0000-7000-8000-000000000002', '018d0000-0000-7000-8000-000000000102', 'Easy 5k', 'Legs still heavy from Sunday.', 'visible', '2024-01-10T18:10:00.000000Z', '2024-01-10T18:10:00.000000Z', NULL),
    ('018d0000-0000-7000-8000-000000000203', '018d0000-0000-7000-8000-000000000003', '018d0000-0000-7000-8000-000000000103', 'Half marathon PB', 'Finally under 1:45!', 'visible', '2024-01-11T10:15:00.000000Z', '2024-01-11T10:15:00.000000Z', NULL),
    ('018d0000-0000-7000-8000-000000000204', '018d0000-0000-7000-8000-000000000004', NULL, 'Shoe advice?', 'Looking for a daily trainer with a wide toe box.', 'visible', '2024-01-11T12:00:00.000000Z', '2024-01-11T12:00:00.000000Z', NULL),
    ('018d0000-0000-7000-8000-000000000205', '018d0000-0000-7000-8000-000000000002', NULL, 'Draft', 'Not ready yet.', 'hidden', '2024-01-11T13:00:00.000000Z', '2024-01-11T13:00:00.000000Z', NULL),
    ('018d0000-0000-7000-8000-000000000206', '018d0000-0000-7000-8000-000000000001', NULL, 'Old news', 'Removed by author.', 'visible', '2024-01-09T09:00:00.000000Z', '2024-01-09T09:00:00.000000Z', '2024-01-09T10:00:00.000000Z');

INSERT OR IGNORE INTO comments (id, post_id, author_id, parent_comment_id, content, created_at, updated_at, deleted_at) VALUES
    ('018d0000-0000-7000-8000-000000000301', '018d0000-0000-7000-8000-000000000203', '018d0000-0000-7000-8000-000000000001', NULL, 'Huge! What was your fuelling plan?', '2024-01-11T10:30:00.000000Z', '2024-01-11T10:30:00.000000Z', NULL),
    ('018d0000-0000-7000-8000-000000000302', '018d0000-0000-7000-8000-000000000203', '018d0000-0000-7000-8000-000000000003', '018d0000-0000-7000-8000-000000000301', 'Two gels, at 7k and 14k.', '2024-01-11T10:45:00.000000Z', '2024-01-11T10:45:00.000000Z', NULL),
    ('018d0000-0000-7000-8000-000000000303', '018d0000-0000-7000-8000-000000000203', '018d0000-0000-7000-8000-000000000002', NULL, 'Congrats!', '2024-01-11T11:00:00.000000Z', '2024-01-11T11:00:00.000000Z', NULL),
    ('018d0000-0000-7000-8000-000000000304', '018d0000-0000-7000-8000-000000000204', '018d0000-0000-7000-8000-000000000003', NULL, 'Try the wide version of your current pair first.', '2024-01-11T12:30:00.000000Z', '2024-01-11T12:30:00.000000Z', NULL);

INSERT OR IGNORE INTO reactions (id, user_id, post_id, comment_id, type, created_at) VALUES
    ('018d0000-0000-7000-8000-000000000401', '018d0000-0000-7000-8000-000000000001', '018d0000-0000-7000-8000-000000000203', NULL, 'fire', '2024-01-11T10:20:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000402', '018d0000-0000-7000-8000-000000000002', '018d0000-0000-7000-8000-000000000203', NULL, 'like', '2024-01-11T10:50:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000403', '018d0000-0000-7000-8000-000000000004', '018d0000-0000-7000-8000-000000000203', NULL, 'like', '2024-01-11T11:10:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000404', '018d0000-0000-7000-8000-000000000003', '018d0000-0000-7000-8000-000000000201', NULL, 'insightful', '2024-01-10T08:00:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000405', '018d0000-0000-7000-8000-000000000001', NULL, '018d0000-0000-7000-8000-000000000302', 'like', '2024-01-11T10:50:00.000000Z');

INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES
    ('018d0000-0000-7000-8000-000000000001', '018d0000-0000-7000-8000-000000000003', '2024-01-05T00:00:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000002', '018d0000-0000-7000-8000-000000000001', '2024-01-05T00:00:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000002', '018d0000-0000-7000-8000-000000000003', '2024-01-06T00:00:00.000000Z'),
    ('018d0000-0000-7000-8000-000000000003', '018d0000-0000-7000-8000-000000000001', '2024-01-06T00:00:00.000000Z');
"#;
