//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument. Composite writes open their
//! own transaction; helpers that take a `&mut Transaction` participate in
//! the caller's.

pub mod activity_repo;
pub mod comment_repo;
pub mod customer_repo;
pub mod request_repo;
pub mod stats_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use comment_repo::CommentRepo;
pub use customer_repo::CustomerRepo;
pub use request_repo::RequestRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;
