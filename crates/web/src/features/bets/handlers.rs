use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        bet::{
            AcceptBetRequest, BetListQuery, BetListResponse, BetResponse, CreateBetRequest,
            ResolveBetRequest,
        },
        delta::MessageResponse,
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/bets",
    params(BetListQuery),
    responses(
        (status = 200, description = "Bets of the episode with eligible and accepted users", body = BetListResponse),
        (status = 404, description = "Episode not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bets"
)]
pub async fn list_bets(
    State(db): State<Database>,
    Query(query): Query<BetListQuery>,
) -> Result<Response, WebError> {
    let bets = services::list_bets(db.pool(), query.episode_number).await?;

    Ok(Json(BetListResponse { bets }).into_response())
}

#[utoipa::path(
    post,
    path = "/bets",
    request_body = CreateBetRequest,
    responses(
        (status = 201, description = "Bet proposed", body = BetResponse),
        (status = 400, description = "Invalid amounts, participants or episode"),
        (status = 404, description = "Episode not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bets"
)]
pub async fn create_bet(
    State(db): State<Database>,
    Json(payload): Json<CreateBetRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;

    let bet = services::create_bet(db.pool(), &payload).await?;

    Ok((StatusCode::CREATED, Json(BetResponse { bet })).into_response())
}

#[utoipa::path(
    post,
    path = "/bets/{bet_id}/accept",
    params(
        ("bet_id" = Uuid, Path, description = "Bet ID")
    ),
    request_body = AcceptBetRequest,
    responses(
        (status = 200, description = "Bet accepted", body = BetResponse),
        (status = 400, description = "Bet already resolved"),
        (status = 403, description = "User is not eligible for this bet"),
        (status = 404, description = "Bet not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bets"
)]
pub async fn accept_bet(
    State(db): State<Database>,
    Path(bet_id): Path<Uuid>,
    Json(payload): Json<AcceptBetRequest>,
) -> Result<Response, WebError> {
    let bet = services::accept_bet(db.pool(), bet_id, payload.user_id).await?;

    Ok(Json(BetResponse { bet }).into_response())
}

#[utoipa::path(
    put,
    path = "/bets/{bet_id}",
    params(
        ("bet_id" = Uuid, Path, description = "Bet ID")
    ),
    request_body = ResolveBetRequest,
    responses(
        (status = 200, description = "Bet outcome recorded", body = BetResponse),
        (status = 404, description = "Bet not found", body = MessageResponse),
        (status = 422, description = "Body without a `won` key")
    ),
    security(("bearer_auth" = [])),
    tag = "bets"
)]
pub async fn resolve_bet(
    State(db): State<Database>,
    Path(bet_id): Path<Uuid>,
    Json(payload): Json<ResolveBetRequest>,
) -> Result<Response, WebError> {
    let bet = services::resolve_bet(db.pool(), bet_id, payload.won)
        .await
        .map_err(WebError::not_found("Bet not found"))?;

    Ok(Json(BetResponse { bet }).into_response())
}

#[utoipa::path(
    delete,
    path = "/bets/{bet_id}",
    params(
        ("bet_id" = Uuid, Path, description = "Bet ID")
    ),
    responses(
        (status = 200, description = "Bet deleted", body = MessageResponse),
        (status = 404, description = "Bet not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bets"
)]
pub async fn delete_bet(
    State(db): State<Database>,
    Path(bet_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_bet(db.pool(), bet_id)
        .await
        .map_err(WebError::not_found("Bet not found"))?;

    Ok(Json(MessageResponse::new("Bet deleted successfully")).into_response())
}
