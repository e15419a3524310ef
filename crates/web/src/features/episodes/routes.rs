use axum::{Router, routing::get};

use super::handlers::{create_episode, get_current_episode, list_episodes, set_current_episode};
use crate::features::deltas;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_episodes).post(create_episode))
        .route("/current", get(get_current_episode).post(set_current_episode))
        .merge(deltas::routes::episode_routes())
}
