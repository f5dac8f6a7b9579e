//! Types shared between the review-assigner core and its HTTP surface.
//!
//! This crate contains:
//! - Row types (e.g., `User`, `PullRequest`) - the API representation of database entities
//! - Request types (e.g., `CreatePullRequestRequest`) - API input types
//! - Shared enums (e.g., `PullRequestStatus`)
//! - Reviewer-set helpers used by the assignment rules

pub mod pull_request;
pub mod response;
pub mod stats;
pub mod team;
pub mod user;

pub use pull_request::*;
pub use response::*;
pub use stats::*;
pub use team::*;
pub use user::*;
