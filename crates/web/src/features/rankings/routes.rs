use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{backfill_rankings, get_rankings, submit_rankings};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_rankings).post(submit_rankings))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/backfill", post(backfill_rankings))
}
