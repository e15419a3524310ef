use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        delta::MessageResponse,
        ranking::{
            BackfillRankingsResponse, RankingsQuery, RankingsResponse, SubmitRankingsRequest,
        },
    },
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/rankings",
    params(RankingsQuery),
    responses(
        (status = 200, description = "The user's rankings for the episode, best first", body = RankingsResponse),
        (status = 404, description = "User or episode not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "rankings"
)]
pub async fn get_rankings(
    State(db): State<Database>,
    Query(query): Query<RankingsQuery>,
) -> Result<Response, WebError> {
    let rankings = services::get_rankings(db.pool(), query.user_id, query.episode_number).await?;

    Ok(Json(RankingsResponse { rankings }).into_response())
}

#[utoipa::path(
    post,
    path = "/rankings",
    request_body = SubmitRankingsRequest,
    responses(
        (status = 201, description = "Rankings replaced", body = RankingsResponse),
        (status = 400, description = "Rankings do not cover the episode's stars exactly once"),
        (status = 404, description = "User or episode not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "rankings"
)]
pub async fn submit_rankings(
    State(db): State<Database>,
    Json(payload): Json<SubmitRankingsRequest>,
) -> Result<Response, WebError> {
    let rankings = services::submit_rankings(db.pool(), &payload).await?;

    Ok((StatusCode::CREATED, Json(RankingsResponse { rankings })).into_response())
}

#[utoipa::path(
    post,
    path = "/admin/rankings/backfill",
    responses(
        (status = 200, description = "Default rankings created where missing", body = BackfillRankingsResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "rankings"
)]
pub async fn backfill_rankings(State(db): State<Database>) -> Result<Response, WebError> {
    let created_count = services::backfill_rankings(db.pool()).await?;

    Ok(Json(BackfillRankingsResponse {
        created_count,
        message: format!("Created {} default rankings", created_count),
    })
    .into_response())
}
