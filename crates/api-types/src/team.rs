use serde::{Deserialize, Serialize};

/// A user as seen from inside a team listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

/// A read-only projection over users sharing a `team_name`.
///
/// Teams have no row of their own: a team exists exactly when at least one
/// user carries its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetTeamQuery {
    pub team_name: String,
}
