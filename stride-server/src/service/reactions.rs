use std::sync::Arc;

use uuid::Uuid;

use stride_types::{
    ListReactionsRequest, ReactionCounts, ReactionCountsRequest, ReactionPage, ReactionTarget,
    ReactionType, ToggleReactionRequest, ToggleResult,
};

use crate::db::StorageAdapter;
use crate::error::{CoreError, CoreResult};
use crate::pagination::PageRequest;

#[derive(Clone)]
pub struct ReactionService {
    storage: Arc<dyn StorageAdapter>,
}

impl ReactionService {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Add the reaction if the user has not applied it yet, otherwise remove it
    pub fn toggle(&self, request: &ToggleReactionRequest) -> CoreResult<ToggleResult> {
        let target = ReactionTarget::new(request.target_type, request.target_id);
        self.ensure_readable(&target)?;

        let action = self
            .storage
            .toggle_reaction(&request.user_id, &target, request.reaction_type)
            .map_err(CoreError::database)?;

        tracing::info!(
            "User {} {} {} reaction on {} {}",
            request.user_id,
            action.as_str(),
            request.reaction_type.as_str(),
            target.target_type().as_str(),
            target.id()
        );

        Ok(ToggleResult {
            action,
            reaction_type: request.reaction_type,
        })
    }

    /// Per-type counts; every type is present, absent ones as 0
    pub fn counts(&self, request: &ReactionCountsRequest) -> CoreResult<ReactionCounts> {
        let target = ReactionTarget::new(request.target_type, request.target_id);
        self.ensure_readable(&target)?;
        self.storage
            .count_reactions_by_type(&target)
            .map_err(CoreError::database)
    }

    pub fn list(&self, request: &ListReactionsRequest) -> CoreResult<ReactionPage> {
        let page = PageRequest::new(request.page, request.limit)?;
        let target = ReactionTarget::new(request.target_type, request.target_id);
        self.ensure_readable(&target)?;

        let total = self.storage.count_reactions(&target).map_err(CoreError::database)?;
        let pagination = page.paginate(total);
        let reactions = if pagination.offset >= total {
            Vec::new()
        } else {
            self.storage
                .find_reactions(&target, pagination.limit, pagination.offset)
                .map_err(CoreError::database)?
        };

        Ok(ReactionPage { reactions, pagination })
    }

    /// Types the user has already applied to the target
    pub fn user_reactions(&self, user_id: &Uuid, target: &ReactionTarget) -> CoreResult<Vec<ReactionType>> {
        self.ensure_readable(target)?;
        self.storage
            .find_user_reaction_types(user_id, target)
            .map_err(CoreError::database)
    }

    /// Posts must be listed; comments must be live and sit on a listed post
    fn ensure_readable(&self, target: &ReactionTarget) -> CoreResult<()> {
        let post_id = match target {
            ReactionTarget::Post(post_id) => *post_id,
            ReactionTarget::Comment(comment_id) => {
                self.storage
                    .find_comment(comment_id)
                    .map_err(CoreError::database)?
                    .ok_or_else(|| CoreError::not_found(format!("comment {comment_id}")))?
                    .post_id
            }
        };

        if self.storage.is_post_listed(&post_id).map_err(CoreError::database)? {
            Ok(())
        } else {
            Err(CoreError::not_found(format!("post {post_id}")))
        }
    }
}
