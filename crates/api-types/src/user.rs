use serde::{Deserialize, Serialize};

/// A user row. `team_name` is the single source of truth for team membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetUserActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeactivateUserRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserReviewsQuery {
    pub user_id: String,
}
