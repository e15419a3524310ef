use std::collections::HashSet;

use sqlx::PgPool;
use storage::{
    dto::ranking::SubmitRankingsRequest,
    models::Ranking,
    repository::{episode::EpisodeRepository, ranking::RankingRepository, user::UserRepository},
};
use uuid::Uuid;

use crate::error::WebError;

type Result<T> = std::result::Result<T, WebError>;

async fn ensure_user_and_episode(pool: &PgPool, user_id: Uuid, episode_number: i32) -> Result<()> {
    UserRepository::new(pool)
        .find_by_id(user_id)
        .await
        .map_err(WebError::not_found("User not found"))?;
    EpisodeRepository::new(pool)
        .find_by_number(episode_number)
        .await
        .map_err(WebError::not_found("Episode not found"))?;
    Ok(())
}

/// A user's rankings for an episode, best first
pub async fn get_rankings(
    pool: &PgPool,
    user_id: Uuid,
    episode_number: i32,
) -> Result<Vec<Ranking>> {
    ensure_user_and_episode(pool, user_id, episode_number).await?;

    Ok(RankingRepository::new(pool)
        .list_for_user(user_id, episode_number)
        .await?)
}

/// Replace a user's rankings for an episode. Every star of the episode must be
/// ranked exactly once.
pub async fn submit_rankings(
    pool: &PgPool,
    request: &SubmitRankingsRequest,
) -> Result<Vec<Ranking>> {
    ensure_user_and_episode(pool, request.user_id, request.episode_number).await?;

    let star_ids: HashSet<i32> = EpisodeRepository::new(pool)
        .star_ids(request.episode_number)
        .await?
        .into_iter()
        .collect();
    request
        .check_against(&star_ids)
        .map_err(WebError::BadRequest)?;

    let rankings = RankingRepository::new(pool)
        .replace_for_user(request.user_id, request.episode_number, &request.entries())
        .await?;

    tracing::info!(
        user_id = %request.user_id,
        episode = request.episode_number,
        "Rankings submitted"
    );

    Ok(rankings)
}

/// Seed default rankings wherever a user has none for an episode
pub async fn backfill_rankings(pool: &PgPool) -> storage::error::Result<u64> {
    let repo = RankingRepository::new(pool);
    let created = repo.backfill_defaults().await?;
    tracing::info!(created, "Backfilled default rankings");
    Ok(created)
}
