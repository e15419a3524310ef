use sqlx::PgPool;
use storage::{
    dto::episode::CreateEpisodeRequest,
    error::Result,
    models::{Episode, PayoutSplits},
    repository::{episode::EpisodeRepository, user::UserRepository},
};
use uuid::Uuid;

use crate::error::WebError;

/// List all episodes
pub async fn list_episodes(pool: &PgPool) -> Result<Vec<Episode>> {
    let repo = EpisodeRepository::new(pool);
    repo.list().await
}

/// Get the current episode, if one is set
pub async fn get_current_episode(pool: &PgPool) -> Result<Option<Episode>> {
    let repo = EpisodeRepository::new(pool);
    repo.find_current().await
}

/// Make an episode the only current one
pub async fn set_current_episode(pool: &PgPool, number: i32) -> Result<Episode> {
    let repo = EpisodeRepository::new(pool);
    let episode = repo.set_current(number).await?;
    tracing::info!(episode = number, "Current episode changed");
    Ok(episode)
}

/// Create an episode, carrying forward the previous star set and seeding
/// default rankings. The payout split for the new number must already exist
/// and match the carried star count.
pub async fn create_episode(
    pool: &PgPool,
    splits: &PayoutSplits,
    request: &CreateEpisodeRequest,
) -> std::result::Result<(Episode, Vec<i32>), WebError> {
    let repo = EpisodeRepository::new(pool);

    let star_ids = repo.carried_star_ids(request.number).await?;
    let split = splits
        .split_for(request.number)
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    if split.len() != star_ids.len() {
        return Err(WebError::BadRequest(format!(
            "Payout split for episode {} has {} entries but {} stars carry over",
            request.number,
            split.len(),
            star_ids.len()
        )));
    }

    let user_ids: Vec<Uuid> = UserRepository::new(pool)
        .list()
        .await?
        .into_iter()
        .map(|user| user.user_id)
        .collect();

    let episode = repo
        .create(request.number, request.has_aired, &star_ids, &user_ids)
        .await?;

    tracing::info!(
        episode = episode.number,
        stars = star_ids.len(),
        users = user_ids.len(),
        "Episode created"
    );

    Ok((episode, star_ids))
}
