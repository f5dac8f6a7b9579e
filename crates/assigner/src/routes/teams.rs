use api_types::{GetTeamQuery, Team};
use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use super::error::ErrorResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/team/add", post(create_team))
        .route("/team/get", get(get_team))
}

#[instrument(name = "teams.create_team", skip(state, payload))]
async fn create_team(
    State(state): State<AppState>,
    payload: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<Team>), ErrorResponse> {
    let Json(team) = payload.map_err(|_| ErrorResponse::invalid_request("invalid request body"))?;

    if team.team_name.is_empty() || team.members.is_empty() {
        return Err(ErrorResponse::invalid_request(
            "team_name and members are required",
        ));
    }
    if team.members.iter().any(|member| member.user_id.is_empty()) {
        return Err(ErrorResponse::invalid_request("member user_id is required"));
    }

    let team = state
        .reviews()
        .create_team(&state.op_context(), team)
        .await?;

    Ok((StatusCode::CREATED, Json(team)))
}

#[instrument(name = "teams.get_team", skip(state, query))]
async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<GetTeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ErrorResponse> {
    let Query(query) = query.map_err(|_| ErrorResponse::invalid_request("team_name is required"))?;
    if query.team_name.is_empty() {
        return Err(ErrorResponse::invalid_request("team_name is required"));
    }

    let team = state
        .reviews()
        .get_team(&state.op_context(), &query.team_name)
        .await?;

    Ok(Json(team))
}
