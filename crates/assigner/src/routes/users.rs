use api_types::{
    DeactivateUserRequest, DeactivateUserResponse, SetUserActiveRequest, User,
    UserReviewsQuery, UserReviewsResponse,
};
use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use tracing::instrument;

use super::error::ErrorResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/setIsActive", post(set_user_active))
        .route("/users/deactivate", post(deactivate_user))
        .route("/users/getReview", get(get_user_reviews))
}

#[instrument(name = "users.set_user_active", skip(state, payload))]
async fn set_user_active(
    State(state): State<AppState>,
    payload: Result<Json<SetUserActiveRequest>, JsonRejection>,
) -> Result<Json<User>, ErrorResponse> {
    let Json(payload) =
        payload.map_err(|_| ErrorResponse::invalid_request("invalid request body"))?;
    if payload.user_id.is_empty() {
        return Err(ErrorResponse::invalid_request("user_id is required"));
    }

    let user = state
        .reviews()
        .set_user_active(&state.op_context(), &payload.user_id, payload.is_active)
        .await?;

    Ok(Json(user))
}

#[instrument(name = "users.deactivate_user", skip(state, payload))]
async fn deactivate_user(
    State(state): State<AppState>,
    payload: Result<Json<DeactivateUserRequest>, JsonRejection>,
) -> Result<Json<DeactivateUserResponse>, ErrorResponse> {
    let Json(payload) =
        payload.map_err(|_| ErrorResponse::invalid_request("invalid request body"))?;
    if payload.user_id.is_empty() {
        return Err(ErrorResponse::invalid_request("user_id is required"));
    }

    let response = state
        .reviews()
        .deactivate_user(&state.op_context(), &payload.user_id)
        .await?;

    Ok(Json(response))
}

#[instrument(name = "users.get_user_reviews", skip(state, query))]
async fn get_user_reviews(
    State(state): State<AppState>,
    query: Result<Query<UserReviewsQuery>, QueryRejection>,
) -> Result<Json<UserReviewsResponse>, ErrorResponse> {
    let Query(query) = query.map_err(|_| ErrorResponse::invalid_request("user_id is required"))?;
    if query.user_id.is_empty() {
        return Err(ErrorResponse::invalid_request("user_id is required"));
    }

    let pull_requests = state
        .reviews()
        .user_reviews(&state.op_context(), &query.user_id)
        .await?;

    Ok(Json(UserReviewsResponse {
        user_id: query.user_id,
        pull_requests,
    }))
}
