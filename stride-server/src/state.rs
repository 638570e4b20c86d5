use std::sync::Arc;

use crate::config::Settings;
use crate::db::{Database, SqliteStorage, StorageAdapter};
use crate::service::{CommentService, FeedService, ReactionService};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Arc<Settings>,
    pub feed: FeedService,
    pub comments: CommentService,
    pub reactions: ReactionService,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let storage: Arc<dyn StorageAdapter> = Arc::new(SqliteStorage::new(db.pool.clone()));
        Self {
            feed: FeedService::new(storage.clone(), settings.feed.trending_days),
            comments: CommentService::new(storage.clone()),
            reactions: ReactionService::new(storage),
            settings: Arc::new(settings),
            db,
        }
    }
}
