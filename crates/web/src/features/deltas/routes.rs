use axum::{
    Router,
    routing::{delete, post},
};

use super::handlers::{calculate_deltas, clear_deltas};
use crate::state::AppState;

/// Delta routes, mounted under `/episodes`.
pub fn episode_routes() -> Router<AppState> {
    Router::new()
        .route("/:episode_number/calculateDeltas", post(calculate_deltas))
        .route("/:episode_number/deltas", delete(clear_deltas))
}
