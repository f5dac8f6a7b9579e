use serde::{Deserialize, Serialize};

use crate::{PullRequest, PullRequestShort, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignReviewerResponse {
    pub pr: PullRequest,
    pub replaced_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}

/// One reviewer swap performed while deactivating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerReplacement {
    pub pull_request_id: String,
    pub replaced_by: String,
}

/// A reassignment that could not be performed during deactivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedReassignment {
    pub pull_request_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivateUserResponse {
    pub user: User,
    pub reassigned: Vec<ReviewerReplacement>,
    pub skipped: Vec<SkippedReassignment>,
}
