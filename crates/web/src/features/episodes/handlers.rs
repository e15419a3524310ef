use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        delta::MessageResponse,
        episode::{
            CreateEpisodeRequest, CreatedEpisodeResponse, CurrentEpisodeResponse,
            EpisodeListResponse, EpisodeResponse, SetCurrentEpisodeRequest,
        },
    },
    models::PayoutSplits,
};
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/episodes",
    responses(
        (status = 200, description = "All episodes ordered by number", body = EpisodeListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "episodes"
)]
pub async fn list_episodes(State(db): State<Database>) -> Result<Response, WebError> {
    let episodes = services::list_episodes(db.pool()).await?;

    Ok(Json(EpisodeListResponse { episodes }).into_response())
}

#[utoipa::path(
    post,
    path = "/episodes",
    request_body = CreateEpisodeRequest,
    responses(
        (status = 201, description = "Episode created", body = CreatedEpisodeResponse),
        (status = 400, description = "Invalid number or no matching payout split"),
        (status = 409, description = "Episode already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "episodes"
)]
pub async fn create_episode(
    State(db): State<Database>,
    State(splits): State<Arc<PayoutSplits>>,
    Json(payload): Json<CreateEpisodeRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;

    let (episode, stars) = services::create_episode(db.pool(), &splits, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedEpisodeResponse { episode, stars }),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/episodes/current",
    responses(
        (status = 200, description = "The current episode, or null", body = CurrentEpisodeResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "episodes"
)]
pub async fn get_current_episode(State(db): State<Database>) -> Result<Response, WebError> {
    let episode = services::get_current_episode(db.pool()).await?;

    Ok(Json(CurrentEpisodeResponse { episode }).into_response())
}

#[utoipa::path(
    post,
    path = "/episodes/current",
    request_body = SetCurrentEpisodeRequest,
    responses(
        (status = 200, description = "Current episode set", body = EpisodeResponse),
        (status = 404, description = "Episode not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "episodes"
)]
pub async fn set_current_episode(
    State(db): State<Database>,
    Json(payload): Json<SetCurrentEpisodeRequest>,
) -> Result<Response, WebError> {
    let episode = services::set_current_episode(db.pool(), payload.episode_number)
        .await
        .map_err(WebError::not_found("Episode not found"))?;

    Ok(Json(EpisodeResponse { episode }).into_response())
}
