use axum::{Router, routing::get};

use super::handlers::{get_balance_history, list_users_with_rankings};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/withRankings/:episode_number", get(list_users_with_rankings))
        .route("/:user_id/deltas", get(get_balance_history))
}
