use axum::{
    Router,
    routing::{get, post, put},
};

use super::handlers::{accept_bet, create_bet, delete_bet, list_bets, resolve_bet};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bets).post(create_bet))
        .route("/:bet_id", put(resolve_bet).delete(delete_bet))
        .route("/:bet_id/accept", post(accept_bet))
}
