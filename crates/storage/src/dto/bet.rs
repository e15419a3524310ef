use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::BetWithAccepters;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBetRequest {
    /// The proposing user.
    pub better_id: Uuid,
    #[validate(length(min = 1, max = 500, message = "Description is required"))]
    pub description: String,
    #[validate(custom(function = "validate_positive"))]
    pub odds: Decimal,
    #[validate(custom(function = "validate_positive"))]
    pub max_lose: Decimal,
    /// Users allowed to accept the bet.
    #[validate(length(min = 1, message = "At least one eligible user is required"))]
    pub eligible_users: Vec<Uuid>,
    /// Defaults to the latest episode.
    pub episode_number: Option<i32>,
}

impl CreateBetRequest {
    /// Rules the field validators cannot express.
    pub fn check_participants(&self) -> Result<(), String> {
        if self.eligible_users.contains(&self.better_id) {
            return Err("The proposer cannot be an eligible user of their own bet".to_string());
        }

        Ok(())
    }
}

fn validate_positive(value: &Decimal) -> Result<(), validator::ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(validator::ValidationError::new("must_be_positive"))
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptBetRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResolveBetRequest {
    /// `true` if the proposer won, `false` if they lost, `null` to un-resolve.
    /// The key is required.
    #[serde(deserialize_with = "Option::deserialize")]
    pub won: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BetListQuery {
    /// Defaults to the latest episode.
    pub episode_number: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BetResponse {
    pub bet: BetWithAccepters,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BetListResponse {
    pub bets: Vec<BetWithAccepters>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_requires_won_key() {
        let result = serde_json::from_str::<ResolveBetRequest>("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_accepts_explicit_null_and_booleans() {
        let cleared: ResolveBetRequest = serde_json::from_str(r#"{ "won": null }"#).unwrap();
        assert_eq!(cleared.won, None);

        let won: ResolveBetRequest = serde_json::from_str(r#"{ "won": true }"#).unwrap();
        assert_eq!(won.won, Some(true));

        let lost: ResolveBetRequest = serde_json::from_str(r#"{ "won": false }"#).unwrap();
        assert_eq!(lost.won, Some(false));
    }

    fn create_request(odds: i64, max_lose: i64) -> CreateBetRequest {
        CreateBetRequest {
            better_id: Uuid::new_v4(),
            description: "Hollywood handshake".to_string(),
            odds: Decimal::from(odds),
            max_lose: Decimal::from(max_lose),
            eligible_users: vec![Uuid::new_v4()],
            episode_number: None,
        }
    }

    #[test]
    fn test_create_rejects_non_positive_amounts() {
        assert!(create_request(2, 10).validate().is_ok());

        let errors = create_request(0, 10).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("odds"));

        let errors = create_request(2, -1).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("max_lose"));
    }

    #[test]
    fn test_create_rejects_proposer_as_eligible() {
        let mut request = create_request(2, 10);
        assert!(request.check_participants().is_ok());

        request.eligible_users.push(request.better_id);
        assert!(request.check_participants().is_err());
    }

    #[test]
    fn test_create_parses_camel_case_body() {
        let better = Uuid::new_v4();
        let eligible = Uuid::new_v4();
        let body = format!(
            r#"{{ "betterId": "{better}", "description": "Raw dough", "odds": "2.5",
                 "maxLose": 20, "eligibleUsers": ["{eligible}"] }}"#
        );

        let request: CreateBetRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(request.better_id, better);
        assert_eq!(request.odds, Decimal::new(25, 1));
        assert_eq!(request.max_lose, Decimal::from(20));
        assert_eq!(request.episode_number, None);
    }
}
