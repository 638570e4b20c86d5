pub mod adapter;
pub mod connection;
pub mod filter;
pub mod repositories;
pub mod row;
pub mod schema;

pub use adapter::{SqliteStorage, StorageAdapter};
pub use connection::{Database, DbPool};
pub use filter::{CommentFilter, PostFilter};
