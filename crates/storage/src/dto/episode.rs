use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Episode;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEpisodeRequest {
    #[validate(range(min = 1, message = "Episode number must be at least 1"))]
    pub number: i32,
    #[serde(default)]
    pub has_aired: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetCurrentEpisodeRequest {
    pub episode_number: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EpisodeResponse {
    pub episode: Episode,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentEpisodeResponse {
    pub episode: Option<Episode>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EpisodeListResponse {
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedEpisodeResponse {
    pub episode: Episode,
    /// Star ids carried into the new episode.
    pub stars: Vec<i32>,
}
