use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        delta::{BalanceHistoryResponse, MessageResponse},
        ranking::UsersWithRankingsResponse,
    },
};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/users/{user_id}/deltas",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Per-episode deltas with running balance", body = BalanceHistoryResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_balance_history(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let entries = services::get_balance_history(db.pool(), user_id)
        .await
        .map_err(WebError::not_found("User not found"))?;

    Ok(Json(BalanceHistoryResponse { user_id, entries }).into_response())
}

#[utoipa::path(
    get,
    path = "/users/withRankings/{episode_number}",
    params(
        ("episode_number" = i32, Path, description = "Episode number")
    ),
    responses(
        (status = 200, description = "Every user with their rankings for the episode", body = UsersWithRankingsResponse),
        (status = 404, description = "Episode not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users_with_rankings(
    State(db): State<Database>,
    Path(episode_number): Path<i32>,
) -> Result<Response, WebError> {
    let users = services::list_users_with_rankings(db.pool(), episode_number)
        .await
        .map_err(WebError::not_found("Episode not found"))?;

    Ok(Json(UsersWithRankingsResponse { users }).into_response())
}
