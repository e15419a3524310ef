use sqlx::PgPool;
use storage::{
    dto::bet::CreateBetRequest,
    error::StorageError,
    models::{BetWithAccepters, NewBet},
    repository::{bet::BetRepository, episode::EpisodeRepository},
};
use uuid::Uuid;

use crate::error::WebError;

type Result<T> = std::result::Result<T, WebError>;

/// The requested episode, which must exist, or else the latest one
async fn resolve_episode(pool: &PgPool, requested: Option<i32>) -> Result<Option<i32>> {
    let repo = EpisodeRepository::new(pool);
    match requested {
        Some(number) => {
            repo.find_by_number(number)
                .await
                .map_err(WebError::not_found("Episode not found"))?;
            Ok(Some(number))
        }
        None => Ok(repo.find_latest().await?.map(|episode| episode.number)),
    }
}

/// List the bets of an episode (default: the latest)
pub async fn list_bets(
    pool: &PgPool,
    episode_number: Option<i32>,
) -> Result<Vec<BetWithAccepters>> {
    match resolve_episode(pool, episode_number).await? {
        Some(number) => Ok(BetRepository::new(pool).list_for_episode(number).await?),
        None => Ok(Vec::new()),
    }
}

/// Propose a bet to a set of eligible users
pub async fn create_bet(pool: &PgPool, request: &CreateBetRequest) -> Result<BetWithAccepters> {
    request.check_participants().map_err(WebError::BadRequest)?;

    let episode_number = resolve_episode(pool, request.episode_number)
        .await?
        .ok_or_else(|| WebError::BadRequest("No episode exists to bet on".to_string()))?;

    let bet = BetRepository::new(pool)
        .create(&NewBet {
            episode_number,
            better_id: request.better_id,
            description: &request.description,
            odds: request.odds,
            max_lose: request.max_lose,
            eligible_users: &request.eligible_users,
        })
        .await
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                WebError::BadRequest("Unknown proposer or eligible user".to_string())
            } else {
                WebError::Storage(e)
            }
        })?;

    tracing::info!(
        bet_id = %bet.bet.bet_id,
        episode = episode_number,
        eligible = bet.eligible_users.len(),
        "Bet proposed"
    );

    Ok(bet)
}

/// Accept a bet on behalf of one of its eligible users
pub async fn accept_bet(
    pool: &PgPool,
    bet_id: Uuid,
    user_id: Uuid,
) -> Result<BetWithAccepters> {
    let repo = BetRepository::new(pool);
    let bet = repo
        .find_by_id(bet_id)
        .await
        .map_err(WebError::not_found("Bet not found"))?;

    if bet.bet.won.is_some() {
        return Err(WebError::BadRequest("Bet is already resolved".to_string()));
    }
    if !bet.is_eligible(user_id) {
        return Err(WebError::Forbidden(
            "User is not eligible for this bet".to_string(),
        ));
    }
    if bet.accepted_users.contains(&user_id) {
        return Ok(bet);
    }

    if !repo.accept(bet_id, user_id).await? {
        return Err(WebError::Storage(StorageError::ConstraintViolation(
            "Bet was resolved before it could be accepted".to_string(),
        )));
    }

    tracing::info!(%bet_id, %user_id, "Bet accepted");

    repo.find_by_id(bet_id)
        .await
        .map_err(WebError::not_found("Bet not found"))
}

/// Record a bet's outcome; `None` marks it unresolved again
pub async fn resolve_bet(
    pool: &PgPool,
    bet_id: Uuid,
    won: Option<bool>,
) -> storage::error::Result<BetWithAccepters> {
    let repo = BetRepository::new(pool);
    let bet = repo.set_outcome(bet_id, won).await?;
    tracing::info!(%bet_id, ?won, "Bet outcome recorded");
    Ok(bet)
}

/// Delete a bet with its eligibility and acceptances
pub async fn delete_bet(pool: &PgPool, bet_id: Uuid) -> storage::error::Result<()> {
    BetRepository::new(pool).delete(bet_id).await?;
    tracing::info!(%bet_id, "Bet deleted");
    Ok(())
}
