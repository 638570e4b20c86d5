//! Core operations: feed planning, trending, reactions and comment threads.
//!
//! Services validate their inputs before touching storage and report failures
//! as [`CoreError`](crate::error::CoreError).

pub mod comments;
pub mod feed;
pub mod reactions;
pub mod trending;

pub use comments::CommentService;
pub use feed::{FeedService, FeedStrategy};
pub use reactions::ReactionService;
pub use trending::TrendingScorer;
