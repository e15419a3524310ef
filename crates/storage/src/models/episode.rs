use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// An episode is identified by its `number`. At most one episode is `current`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub number: i32,
    pub has_aired: bool,
    pub current: bool,
    pub created_at: NaiveDateTime,
}
