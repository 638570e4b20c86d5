use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use stride_types::{FeedFilter, FeedPage, FeedPost, ListFeedRequest, Run};

use crate::db::repositories::PostKey;
use crate::db::{PostFilter, StorageAdapter};
use crate::error::{CoreError, CoreResult};
use crate::pagination::{self, PageRequest};
use crate::service::trending::{self, TrendingScorer};

/// How a feed request is answered, resolved from its filter
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStrategy {
    /// Candidates newest first; sort and window run in SQL
    Chronological(PostFilter),
    /// Candidates ranked by recent engagement, then newest first
    Trending { candidates: PostFilter, days_ago: f64 },
    /// Nothing can match (following nobody)
    Empty,
}

#[derive(Clone)]
pub struct FeedService {
    storage: Arc<dyn StorageAdapter>,
    scorer: TrendingScorer,
    trending_days: f64,
}

impl FeedService {
    pub fn new(storage: Arc<dyn StorageAdapter>, trending_days: f64) -> Self {
        Self {
            scorer: TrendingScorer::new(storage.clone()),
            storage,
            trending_days,
        }
    }

    pub fn list_feed(&self, request: &ListFeedRequest) -> CoreResult<FeedPage> {
        let page = PageRequest::new(request.page, request.limit)?;
        let strategy = self.plan(request.filter, request.user_id)?;

        tracing::debug!(
            "Feed {} page {} (limit {}) via {:?}",
            request.filter.as_str(),
            page.page,
            page.limit,
            strategy
        );

        match strategy {
            FeedStrategy::Empty => Ok(FeedPage {
                posts: Vec::new(),
                pagination: page.paginate(0),
            }),
            FeedStrategy::Chronological(filter) => self.chronological(&filter, page),
            FeedStrategy::Trending { candidates, days_ago } => self.trending(&candidates, days_ago, page),
        }
    }

    /// Resolve a filter into a strategy. Following needs the viewer's id.
    pub fn plan(&self, filter: FeedFilter, user_id: Option<Uuid>) -> CoreResult<FeedStrategy> {
        match filter {
            FeedFilter::Default => Ok(FeedStrategy::Chronological(PostFilter::listed())),
            FeedFilter::Following => {
                let user_id = user_id.ok_or_else(|| CoreError::input("following feed requires a user id"))?;
                let targets = self
                    .storage
                    .find_follow_targets(&user_id)
                    .map_err(CoreError::database)?;
                if targets.is_empty() {
                    return Ok(FeedStrategy::Empty);
                }
                Ok(FeedStrategy::Chronological(PostFilter::by_authors(targets)))
            }
            FeedFilter::Trending => Ok(FeedStrategy::Trending {
                candidates: PostFilter::listed(),
                days_ago: self.trending_days,
            }),
        }
    }

    pub fn get_post(&self, post_id: &Uuid) -> CoreResult<FeedPost> {
        self.storage
            .find_post(post_id)
            .map_err(CoreError::database)?
            .ok_or_else(|| CoreError::not_found(format!("post {post_id}")))
    }

    /// The run attached to a visible post
    pub fn get_post_run(&self, post_id: &Uuid) -> CoreResult<Run> {
        if !self.storage.is_post_listed(post_id).map_err(CoreError::database)? {
            return Err(CoreError::not_found(format!("post {post_id}")));
        }
        self.storage
            .find_run_by_post_id(post_id)
            .map_err(CoreError::database)?
            .ok_or_else(|| CoreError::not_found(format!("run for post {post_id}")))
    }

    fn chronological(&self, filter: &PostFilter, page: PageRequest) -> CoreResult<FeedPage> {
        let total = self.storage.count_posts(filter).map_err(CoreError::database)?;
        let pagination = page.paginate(total);

        let posts = if pagination.offset >= total {
            Vec::new()
        } else {
            self.storage
                .find_posts(filter, pagination.limit, pagination.offset)
                .map_err(CoreError::database)?
        };

        Ok(FeedPage { posts, pagination })
    }

    fn trending(&self, candidates: &PostFilter, days_ago: f64, page: PageRequest) -> CoreResult<FeedPage> {
        let cutoff = trending::cutoff(Utc::now(), days_ago)?;
        let keys = self.storage.find_post_keys(candidates).map_err(CoreError::database)?;
        let ids: Vec<Uuid> = keys.iter().map(|key| key.id).collect();
        let scores = self.scorer.scores_since(&ids, cutoff)?;

        let ranked = rank(keys, &scores);
        let pagination = page.paginate(ranked.len() as u64);
        let page_ids = pagination::window(ranked, &pagination);

        let mut posts = self
            .storage
            .find_posts_by_ids(&page_ids)
            .map_err(CoreError::database)?;
        for post in &mut posts {
            post.trending_score = Some(scores.get(&post.id).copied().unwrap_or(0));
        }

        Ok(FeedPage { posts, pagination })
    }
}

/// Candidate ids ordered by score, then newest first, then id
fn rank(mut keys: Vec<PostKey>, scores: &HashMap<Uuid, u64>) -> Vec<Uuid> {
    let score = |key: &PostKey| scores.get(&key.id).copied().unwrap_or(0);
    keys.sort_by(|a, b| {
        score(b)
            .cmp(&score(a))
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });
    keys.into_iter().map(|key| key.id).collect()
}
