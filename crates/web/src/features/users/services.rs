use std::collections::HashMap;

use sqlx::PgPool;
use storage::{
    dto::{
        delta::{BalanceEntry, UserSummary},
        ranking::UserWithRankings,
    },
    error::Result,
    models::Ranking,
    repository::{
        episode::EpisodeRepository, ranking::RankingRepository, user::UserRepository,
        user_delta::UserDeltaRepository,
    },
};
use uuid::Uuid;

/// Stored deltas for a user with the running balance after each episode
pub async fn get_balance_history(pool: &PgPool, user_id: Uuid) -> Result<Vec<BalanceEntry>> {
    UserRepository::new(pool).find_by_id(user_id).await?;

    let deltas = UserDeltaRepository::new(pool).list_for_user(user_id).await?;

    Ok(BalanceEntry::running(deltas))
}

/// Every user with their rankings for an episode; users who have not ranked
/// come back with an empty list
pub async fn list_users_with_rankings(
    pool: &PgPool,
    episode_number: i32,
) -> Result<Vec<UserWithRankings>> {
    EpisodeRepository::new(pool)
        .find_by_number(episode_number)
        .await?;

    let users = UserRepository::new(pool).list().await?;
    let rankings = RankingRepository::new(pool)
        .list_for_episode(episode_number)
        .await?;

    let mut by_user: HashMap<Uuid, Vec<Ranking>> = HashMap::new();
    for ranking in rankings {
        by_user.entry(ranking.user_id).or_default().push(ranking);
    }

    Ok(users
        .iter()
        .map(|user| UserWithRankings {
            user: UserSummary::from(user),
            rankings: by_user.remove(&user.user_id).unwrap_or_default(),
        })
        .collect())
}
