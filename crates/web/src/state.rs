use std::sync::Arc;

use axum::extract::FromRef;
use storage::{Database, models::PayoutSplits};

/// Router state: the pool plus the payout split table validated at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub splits: Arc<PayoutSplits>,
}

impl AppState {
    pub fn new(db: Database, splits: PayoutSplits) -> Self {
        Self {
            db,
            splits: Arc::new(splits),
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<PayoutSplits> {
    fn from_ref(state: &AppState) -> Self {
        state.splits.clone()
    }
}
