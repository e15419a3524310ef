use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::delta::{
        CalculateDeltasRequest, CalculateDeltasResponse, MessageResponse,
        UsersWithoutRankingsResponse,
    },
    models::PayoutSplits,
};

use crate::error::WebError;
use crate::extract::OptionalJson;

use super::services;

#[utoipa::path(
    post,
    path = "/episodes/{episode_number}/calculateDeltas",
    params(
        ("episode_number" = i32, Path, description = "Episode number")
    ),
    request_body(content = CalculateDeltasRequest, description = "Optional; `force` defaults to false"),
    responses(
        (status = 200, description = "Deltas calculated for every user", body = CalculateDeltasResponse),
        (status = 400, description = "Some users have not ranked this episode, or the body is malformed", body = UsersWithoutRankingsResponse),
        (status = 404, description = "Episode not found", body = MessageResponse),
        (status = 500, description = "Payout split misconfigured or storage failure")
    ),
    security(("bearer_auth" = [])),
    tag = "deltas"
)]
pub async fn calculate_deltas(
    State(db): State<Database>,
    State(splits): State<Arc<PayoutSplits>>,
    Path(episode_number): Path<i32>,
    OptionalJson(payload): OptionalJson<CalculateDeltasRequest>,
) -> Result<Response, WebError> {
    let request = payload.unwrap_or_default();

    services::calculate_deltas(db.pool(), &splits, episode_number, request.force).await?;

    Ok(Json(CalculateDeltasResponse::default()).into_response())
}

#[utoipa::path(
    delete,
    path = "/episodes/{episode_number}/deltas",
    params(
        ("episode_number" = i32, Path, description = "Episode number")
    ),
    responses(
        (status = 200, description = "Deltas cleared", body = MessageResponse),
        (status = 404, description = "Episode not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "deltas"
)]
pub async fn clear_deltas(
    State(db): State<Database>,
    Path(episode_number): Path<i32>,
) -> Result<Response, WebError> {
    services::clear_deltas(db.pool(), episode_number).await?;

    Ok(Json(MessageResponse::new("Deltas cleared successfully")).into_response())
}
