use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Upper bound on the reviewer set of a single pull request.
pub const MAX_REVIEWERS: usize = 2;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type,
)]
#[sqlx(type_name = "pr_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    pub const ALL: [PullRequestStatus; 2] = [PullRequestStatus::Open, PullRequestStatus::Merged];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        contains_reviewer(&self.assigned_reviewers, user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePullRequestRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergePullRequestRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReassignReviewerRequest {
    pub pull_request_id: String,
    pub old_user_id: String,
}

/// Returns true when `user_id` appears in `reviewers`.
pub fn contains_reviewer(reviewers: &[String], user_id: &str) -> bool {
    reviewers.iter().any(|reviewer| reviewer == user_id)
}

/// Replaces every occurrence of `old` with `replacement`, keeping the
/// position of all other reviewers.
pub fn replace_reviewer(reviewers: &[String], old: &str, replacement: &str) -> Vec<String> {
    reviewers
        .iter()
        .map(|reviewer| {
            if reviewer == old {
                replacement.to_string()
            } else {
                reviewer.clone()
            }
        })
        .collect()
}
