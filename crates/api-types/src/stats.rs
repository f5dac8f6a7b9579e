use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::PullRequestStatus;

/// Number of pull requests currently listing `user_id` as a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewerLoad {
    pub user_id: String,
    pub review_count: i64,
}

/// Point-in-time aggregate over users and pull requests. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_prs: i64,
    pub prs_by_status: BTreeMap<PullRequestStatus, i64>,
    /// Ordered by `review_count` descending, then `user_id`.
    pub reviews_by_user: Vec<ReviewerLoad>,
    pub active_users: i64,
    pub total_teams: i64,
}
