use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{User, UserDelta};

pub const USERS_WITHOUT_RANKINGS: &str = "USERS_WITHOUT_RANKINGS";

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CalculateDeltasRequest {
    /// Calculate even if some users have not ranked this episode.
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct CalculateDeltasResponse {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            name: user.display_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsersWithoutRankingsResponse {
    pub error: String,
    pub message: String,
    pub users_without_rankings: Vec<UserSummary>,
}

impl UsersWithoutRankingsResponse {
    pub fn new(users: Vec<UserSummary>) -> Self {
        Self {
            error: USERS_WITHOUT_RANKINGS.to_string(),
            message: format!(
                "{} user(s) have not submitted rankings for this episode",
                users.len()
            ),
            users_without_rankings: users,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    pub episode_number: i32,
    pub delta: Decimal,
    /// Running total of deltas up to and including this episode.
    pub balance: Decimal,
    pub computed_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceHistoryResponse {
    pub user_id: Uuid,
    pub entries: Vec<BalanceEntry>,
}

impl BalanceEntry {
    /// Pairs each stored delta (ordered by episode) with the running balance.
    pub fn running(deltas: Vec<UserDelta>) -> Vec<Self> {
        let mut balance = Decimal::ZERO;

        deltas
            .into_iter()
            .map(|row| {
                balance += row.delta;
                Self {
                    episode_number: row.episode_number,
                    delta: row.delta,
                    balance,
                    computed_at: row.computed_at,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(episode_number: i32, delta: i64) -> UserDelta {
        UserDelta {
            user_id: Uuid::nil(),
            episode_number,
            delta: Decimal::from(delta),
            computed_at: Default::default(),
        }
    }

    #[test]
    fn test_running_balance_accumulates() {
        let entries = BalanceEntry::running(vec![row(1, 12), row(2, -20), row(4, 3)]);

        let balances: Vec<Decimal> = entries.iter().map(|e| e.balance).collect();
        assert_eq!(
            balances,
            vec![Decimal::from(12), Decimal::from(-8), Decimal::from(-5)]
        );
        assert_eq!(entries[2].episode_number, 4);
    }

    #[test]
    fn test_users_without_rankings_payload_shape() {
        let payload = UsersWithoutRankingsResponse::new(vec![UserSummary {
            id: Uuid::nil(),
            name: "Paul Hollywood".to_string(),
        }]);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["error"], "USERS_WITHOUT_RANKINGS");
        assert_eq!(
            json["usersWithoutRankings"][0]["id"],
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(json["usersWithoutRankings"][0]["name"], "Paul Hollywood");
        assert!(json["message"].is_string());
    }

    #[test]
    fn test_calculate_request_defaults_force_off() {
        let request: CalculateDeltasRequest = serde_json::from_str("{}").unwrap();
        assert!(!request.force);

        let body = serde_json::to_string(&CalculateDeltasResponse::default()).unwrap();
        assert_eq!(body, "{}");
    }
}
