use axum::{Router, middleware};

use crate::features::{bets, episodes, rankings, users};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

/// Every API route, all behind bearer-token auth.
pub fn router(state: AppState, api_keys: ApiKeys) -> Router {
    Router::new()
        .nest("/episodes", episodes::routes::routes())
        .nest("/bets", bets::routes::routes())
        .nest("/users", users::routes::routes())
        .nest("/rankings", rankings::routes::routes())
        .nest("/admin/rankings", rankings::routes::admin_routes())
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
        .with_state(state)
}
