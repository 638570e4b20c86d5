// Shared fixture for the integration tests: one database with the
// repositories for seeding and the services under test on top.
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use stride_server::config::Settings;
use stride_server::db::repositories::{
    CommentRepository, FollowRepository, PostRepository, RunRepository, UserRepository,
};
use stride_server::db::{Database, SqliteStorage, StorageAdapter};
use stride_server::service::{CommentService, FeedService, ReactionService, TrendingScorer};
use stride_server::state::AppState;
use stride_types::{Comment, Post, Reaction, ReactionTarget, ReactionType, Run, User};

pub struct Fixture {
    pub db: Database,
    pub storage: Arc<dyn StorageAdapter>,
    pub feed: FeedService,
    pub comments: CommentService,
    pub reactions: ReactionService,
    pub scorer: TrendingScorer,
    pub now: DateTime<Utc>,
    _dir: Option<TempDir>,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        Self::with_database(Database::in_memory()?, None)
    }

    /// A file-backed database with the full connection pool, so callers on
    /// different threads really do hold separate connections
    pub fn on_disk() -> Result<Self> {
        let dir = TempDir::new()?;
        let db = Database::new(dir.path().join("stride.db"))?;
        db.initialize()?;
        Self::with_database(db, Some(dir))
    }

    fn with_database(db: Database, dir: Option<TempDir>) -> Result<Self> {
        let storage: Arc<dyn StorageAdapter> = Arc::new(SqliteStorage::new(db.pool.clone()));
        Ok(Self {
            feed: FeedService::new(storage.clone(), 1.0),
            comments: CommentService::new(storage.clone()),
            reactions: ReactionService::new(storage.clone()),
            scorer: TrendingScorer::new(storage.clone()),
            storage,
            db,
            now: Utc::now(),
            _dir: dir,
        })
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.db.clone(), Settings::default())
    }

    pub fn user(&self, username: &str) -> Result<User> {
        let user = User::new(username, None);
        UserRepository::new(self.db.pool.clone()).create(&user)?;
        Ok(user)
    }

    /// A visible post created `minutes_ago` minutes before the fixture's clock
    pub fn post(&self, author: &User, title: &str, minutes_ago: i64) -> Result<Post> {
        let post = Post::new(author.id, None, title, format!("{title} notes"))
            .backdated(self.now - Duration::minutes(minutes_ago));
        PostRepository::new(self.db.pool.clone()).create(&post)?;
        Ok(post)
    }

    pub fn post_with_run(&self, author: &User, title: &str, distance_meters: f64, duration_seconds: i64) -> Result<(Post, Run)> {
        let run = Run::new(
            author.id,
            distance_meters,
            duration_seconds,
            Some("Riverside loop".to_string()),
            self.now - Duration::hours(2),
        );
        RunRepository::new(self.db.pool.clone()).create(&run)?;
        let post = Post::new(author.id, Some(run.id), title, "");
        PostRepository::new(self.db.pool.clone()).create(&post)?;
        Ok((post, run))
    }

    pub fn posts(&self) -> PostRepository {
        PostRepository::new(self.db.pool.clone())
    }

    pub fn follow(&self, follower: &User, following: &User) -> Result<()> {
        FollowRepository::new(self.db.pool.clone()).follow_user(&follower.id, &following.id)
    }

    pub fn comment(&self, post: &Post, author: &User, parent: Option<&Comment>, content: &str, minutes_ago: i64) -> Result<Comment> {
        let comment = Comment::new(post.id, author.id, parent.map(|c| c.id), content)
            .backdated(self.now - Duration::minutes(minutes_ago));
        CommentRepository::new(self.db.pool.clone()).insert(&comment)?;
        Ok(comment)
    }

    /// A reaction on a post created `hours_ago` hours before the fixture's clock
    pub fn react(&self, user: &User, post: &Post, reaction_type: ReactionType, hours_ago: i64) -> Result<Reaction> {
        let reaction = Reaction::new(user.id, ReactionTarget::Post(post.id), reaction_type)
            .backdated(self.now - Duration::hours(hours_ago));
        self.storage.insert_reaction(&reaction)?;
        Ok(reaction)
    }

    pub fn users(&self, prefix: &str, n: usize) -> Result<Vec<User>> {
        (0..n).map(|i| self.user(&format!("{prefix}{i}"))).collect()
    }

    pub fn unknown_id() -> Uuid {
        Uuid::now_v7()
    }
}
