use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One user's placement of one star in one episode (1 = best).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub ranking_id: Uuid,
    pub user_id: Uuid,
    pub star_id: i32,
    pub episode_number: i32,
    pub rank: i32,
}
