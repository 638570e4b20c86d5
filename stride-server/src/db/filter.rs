//! WHERE clause builders for posts and comments.
//!
//! Every post and comment read goes through these builders, and the builders
//! always start from the visibility predicate, so a soft-deleted or hidden row
//! can't leak into a read path by a query forgetting its filter.

use rusqlite::types::Value;
use uuid::Uuid;

use stride_types::PostStatus;

use super::row::placeholders;

/// A SQL boolean expression and its positional parameters
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl Predicate {
    /// Rows of `alias` that are not soft-deleted
    pub fn live(alias: &str) -> Self {
        Self {
            clauses: vec![format!("{alias}.deleted_at IS NULL")],
            params: Vec::new(),
        }
    }

    /// Posts of `alias` that may appear in any listing
    pub fn listed_post(alias: &str) -> Self {
        Self::live(alias).and(
            format!("{alias}.status = ?"),
            [Value::Text(PostStatus::Visible.as_str().to_string())],
        )
    }

    pub fn and(mut self, clause: impl Into<String>, params: impl IntoIterator<Item = Value>) -> Self {
        self.clauses.push(clause.into());
        self.params.extend(params);
        self
    }

    /// Restrict `column` to one of `ids`; an empty list matches nothing
    pub fn and_in(self, column: &str, ids: &[Uuid]) -> Self {
        if ids.is_empty() {
            return self.and("0", std::iter::empty());
        }
        let clause = format!("{column} IN ({})", placeholders(ids.len()));
        self.and(clause, ids.iter().map(|id| Value::Text(id.to_string())))
    }

    pub fn sql(&self) -> String {
        self.clauses.join(" AND ")
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Which posts a feed query considers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    authors: Option<Vec<Uuid>>,
    ids: Option<Vec<Uuid>>,
}

impl PostFilter {
    /// Every visible, non-deleted post
    pub fn listed() -> Self {
        Self::default()
    }

    pub fn by_authors(authors: Vec<Uuid>) -> Self {
        Self {
            authors: Some(authors),
            ..Self::default()
        }
    }

    pub fn by_ids(ids: Vec<Uuid>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn to_predicate(&self, alias: &str) -> Predicate {
        let mut predicate = Predicate::listed_post(alias);
        if let Some(authors) = &self.authors {
            predicate = predicate.and_in(&format!("{alias}.author_id"), authors);
        }
        if let Some(ids) = &self.ids {
            predicate = predicate.and_in(&format!("{alias}.id"), ids);
        }
        predicate
    }
}

/// Which comments a thread query considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentFilter {
    /// Every live comment on a post, at any depth
    Post(Uuid),
    /// Live comments on a post with no parent
    TopLevel(Uuid),
    /// Live direct replies to a comment
    Replies(Uuid),
}

impl CommentFilter {
    pub fn to_predicate(&self, alias: &str) -> Predicate {
        let live = Predicate::live(alias);
        match self {
            CommentFilter::Post(post_id) => live.and(
                format!("{alias}.post_id = ?"),
                [Value::Text(post_id.to_string())],
            ),
            CommentFilter::TopLevel(post_id) => live.and(
                format!("{alias}.post_id = ? AND {alias}.parent_comment_id IS NULL"),
                [Value::Text(post_id.to_string())],
            ),
            CommentFilter::Replies(parent_id) => live.and(
                format!("{alias}.parent_comment_id = ?"),
                [Value::Text(parent_id.to_string())],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_posts_always_filter_visibility() {
        let predicate = PostFilter::listed().to_predicate("p");
        assert_eq!(predicate.sql(), "p.deleted_at IS NULL AND p.status = ?");
        assert_eq!(predicate.params(), &[Value::Text("visible".to_string())]);
    }

    #[test]
    fn test_author_filter_keeps_visibility() {
        let authors = vec![Uuid::now_v7(), Uuid::now_v7()];
        let predicate = PostFilter::by_authors(authors.clone()).to_predicate("p");

        assert_eq!(
            predicate.sql(),
            "p.deleted_at IS NULL AND p.status = ? AND p.author_id IN (?, ?)"
        );
        assert_eq!(predicate.params().len(), 3);
        assert_eq!(predicate.params()[1], Value::Text(authors[0].to_string()));
    }

    #[test]
    fn test_empty_author_list_matches_nothing() {
        let predicate = PostFilter::by_authors(Vec::new()).to_predicate("p");
        assert!(predicate.sql().ends_with("AND 0"));
    }

    #[test]
    fn test_comment_filters_exclude_deleted() {
        let id = Uuid::now_v7();
        for filter in [
            CommentFilter::Post(id),
            CommentFilter::TopLevel(id),
            CommentFilter::Replies(id),
        ] {
            let predicate = filter.to_predicate("c");
            assert!(predicate.sql().starts_with("c.deleted_at IS NULL"));
            assert_eq!(predicate.params(), &[Value::Text(id.to_string())]);
        }
    }
}
