mod comment_repository;
mod follow_repository;
mod post_repository;
mod reaction_repository;
mod run_repository;
mod user_repository;

pub use comment_repository::CommentRepository;
pub use follow_repository::FollowRepository;
pub use post_repository::{PostKey, PostRepository};
pub use reaction_repository::ReactionRepository;
pub use run_repository::RunRepository;
pub use user_repository::UserRepository;
