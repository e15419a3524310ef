use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A wager proposed by `better_id`. `won` stays `None` until an admin resolves it;
/// `Some(true)` means the proposer won.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub bet_id: Uuid,
    pub episode_number: i32,
    pub better_id: Uuid,
    pub description: String,
    pub odds: Decimal,
    pub max_lose: Decimal,
    pub won: Option<bool>,
    pub created_at: NaiveDateTime,
}

/// A bet with the users the proposer offered it to and those who took it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BetWithAccepters {
    #[serde(flatten)]
    pub bet: Bet,
    pub eligible_users: Vec<Uuid>,
    pub accepted_users: Vec<Uuid>,
}

impl BetWithAccepters {
    /// True for the proposer and every accepter; eligibility alone settles nothing.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.bet.better_id == user_id || self.accepted_users.contains(&user_id)
    }

    pub fn is_eligible(&self, user_id: Uuid) -> bool {
        self.eligible_users.contains(&user_id)
    }
}

/// Fields of a bet about to be proposed.
#[derive(Debug, Clone)]
pub struct NewBet<'a> {
    pub episode_number: i32,
    pub better_id: Uuid,
    pub description: &'a str,
    pub odds: Decimal,
    pub max_lose: Decimal,
    pub eligible_users: &'a [Uuid],
}
