use sqlx::PgPool;
use storage::{
    models::{PayoutSplits, UserDelta},
    services::delta_computation::{self, Result},
};

/// Calculate and store every user's delta for an episode
pub async fn calculate_deltas(
    pool: &PgPool,
    splits: &PayoutSplits,
    episode_number: i32,
    force: bool,
) -> Result<Vec<UserDelta>> {
    delta_computation::calculate_deltas(pool, splits, episode_number, force).await
}

/// Remove every stored delta for an episode
pub async fn clear_deltas(pool: &PgPool, episode_number: i32) -> Result<u64> {
    delta_computation::clear_deltas(pool, episode_number).await
}
