// Library exports for stride-server
// The binary and the integration tests both build on these modules

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod service;
pub mod state;

pub use error::{CoreError, CoreResult};
