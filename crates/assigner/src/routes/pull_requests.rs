use api_types::{
    CreatePullRequestRequest, MergePullRequestRequest, PullRequest, ReassignReviewerRequest,
    ReassignReviewerResponse,
};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use tracing::instrument;

use super::error::ErrorResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pullRequest/create", post(create_pull_request))
        .route("/pullRequest/merge", post(merge_pull_request))
        .route("/pullRequest/reassign", post(reassign_reviewer))
}

#[instrument(name = "pull_requests.create_pull_request", skip(state, payload))]
async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequest>), ErrorResponse> {
    let Json(payload) =
        payload.map_err(|_| ErrorResponse::invalid_request("invalid request body"))?;
    if payload.pull_request_id.is_empty() || payload.author_id.is_empty() {
        return Err(ErrorResponse::invalid_request(
            "pull_request_id and author_id are required",
        ));
    }

    let pr = state
        .reviews()
        .create_pull_request(
            &state.op_context(),
            &payload.pull_request_id,
            &payload.pull_request_name,
            &payload.author_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(pr)))
}

#[instrument(name = "pull_requests.merge_pull_request", skip(state, payload))]
async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> Result<Json<PullRequest>, ErrorResponse> {
    let Json(payload) =
        payload.map_err(|_| ErrorResponse::invalid_request("invalid request body"))?;
    if payload.pull_request_id.is_empty() {
        return Err(ErrorResponse::invalid_request("pull_request_id is required"));
    }

    let pr = state
        .reviews()
        .merge_pull_request(&state.op_context(), &payload.pull_request_id)
        .await?;

    Ok(Json(pr))
}

#[instrument(name = "pull_requests.reassign_reviewer", skip(state, payload))]
async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignReviewerRequest>, JsonRejection>,
) -> Result<Json<ReassignReviewerResponse>, ErrorResponse> {
    let Json(payload) =
        payload.map_err(|_| ErrorResponse::invalid_request("invalid request body"))?;
    if payload.pull_request_id.is_empty() || payload.old_user_id.is_empty() {
        return Err(ErrorResponse::invalid_request(
            "pull_request_id and old_user_id are required",
        ));
    }

    let reassignment = state
        .reviews()
        .reassign_reviewer(
            &state.op_context(),
            &payload.pull_request_id,
            &payload.old_user_id,
        )
        .await?;

    Ok(Json(ReassignReviewerResponse {
        pr: reassignment.pull_request,
        replaced_by: reassignment.replaced_by,
    }))
}
