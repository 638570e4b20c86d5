use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use stride_types::{
    Comment, CommentPage, CreateCommentRequest, ListCommentsRequest, ListRepliesRequest,
};

use crate::db::{CommentFilter, StorageAdapter};
use crate::error::{CoreError, CoreResult};
use crate::pagination::PageRequest;

/// Trimmed comment text, rejected when nothing is left
fn validate_content(content: &str) -> CoreResult<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::input("comment content cannot be empty"));
    }
    Ok(trimmed)
}

#[derive(Clone)]
pub struct CommentService {
    storage: Arc<dyn StorageAdapter>,
}

impl CommentService {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Live comments on a visible post, top-level only unless asked otherwise
    pub fn list_comments(&self, request: &ListCommentsRequest) -> CoreResult<CommentPage> {
        let page = PageRequest::new(request.page, request.limit)?;
        self.ensure_post_listed(&request.post_id)?;

        let filter = if request.top_level_only {
            CommentFilter::TopLevel(request.post_id)
        } else {
            CommentFilter::Post(request.post_id)
        };
        self.page(filter, page)
    }

    pub fn list_top_level(&self, post_id: Uuid, page: i64, limit: i64) -> CoreResult<CommentPage> {
        self.list_comments(&ListCommentsRequest {
            post_id,
            page,
            limit,
            top_level_only: true,
        })
    }

    /// Live direct replies to a live comment on a visible post
    pub fn list_replies(&self, request: &ListRepliesRequest) -> CoreResult<CommentPage> {
        let page = PageRequest::new(request.page, request.limit)?;
        let parent = self.live_comment(&request.parent_comment_id)?;
        self.ensure_post_listed(&parent.post_id)?;
        self.page(CommentFilter::Replies(request.parent_comment_id), page)
    }

    pub fn create(&self, post_id: Uuid, author_id: Uuid, request: &CreateCommentRequest) -> CoreResult<Comment> {
        let content = validate_content(&request.content)?;
        self.ensure_post_listed(&post_id)?;

        if let Some(parent_id) = request.parent_comment_id {
            let parent = self.live_comment(&parent_id)?;
            if parent.post_id != post_id {
                return Err(CoreError::input(format!(
                    "parent comment {parent_id} belongs to a different post"
                )));
            }
        }

        let comment = Comment::new(post_id, author_id, request.parent_comment_id, content);
        self.storage.insert_comment(&comment).map_err(CoreError::database)?;

        tracing::info!("User {} commented {} on post {}", author_id, comment.id, post_id);
        Ok(comment)
    }

    pub fn update(&self, comment_id: &Uuid, content: &str) -> CoreResult<Comment> {
        let content = validate_content(content)?;
        let updated = self.live_comment(comment_id)?.with_content(content, Utc::now());

        // The row can be deleted between the read and the write
        if !self.storage.update_comment(&updated).map_err(CoreError::database)? {
            return Err(CoreError::not_found(format!("comment {comment_id}")));
        }

        tracing::info!("Updated comment {}", comment_id);
        Ok(updated)
    }

    /// Soft delete; replies stay readable
    pub fn remove(&self, comment_id: &Uuid) -> CoreResult<()> {
        if !self.storage.soft_delete_comment(comment_id).map_err(CoreError::database)? {
            return Err(CoreError::not_found(format!("comment {comment_id}")));
        }
        tracing::info!("Deleted comment {}", comment_id);
        Ok(())
    }

    fn page(&self, filter: CommentFilter, page: PageRequest) -> CoreResult<CommentPage> {
        let total = self.storage.count_comments(&filter).map_err(CoreError::database)?;
        let pagination = page.paginate(total);
        let comments = if pagination.offset >= total {
            Vec::new()
        } else {
            self.storage
                .find_comments(&filter, pagination.limit, pagination.offset)
                .map_err(CoreError::database)?
        };
        Ok(CommentPage { comments, pagination })
    }

    fn live_comment(&self, comment_id: &Uuid) -> CoreResult<Comment> {
        self.storage
            .find_comment(comment_id)
            .map_err(CoreError::database)?
            .ok_or_else(|| CoreError::not_found(format!("comment {comment_id}")))
    }

    fn ensure_post_listed(&self, post_id: &Uuid) -> CoreResult<()> {
        if self.storage.is_post_listed(post_id).map_err(CoreError::database)? {
            Ok(())
        } else {
            Err(CoreError::not_found(format!("post {post_id}")))
        }
    }
}
