use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Net point change for one user in one episode. Keyed by (user_id, episode_number).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDelta {
    pub user_id: Uuid,
    pub episode_number: i32,
    pub delta: Decimal,
    pub computed_at: NaiveDateTime,
}
