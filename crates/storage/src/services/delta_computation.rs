use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::dto::delta::UserSummary;
use crate::error::StorageError;
use crate::models::{
    BetWithAccepters, PayoutSplits, Ranking, ScoredEvent, SplitError, User, UserDelta,
};
use crate::repository::{
    bet::BetRepository, episode::EpisodeRepository, event::EventRepository,
    ranking::RankingRepository, user::UserRepository, user_delta::UserDeltaRepository,
};

/// Advisory lock namespace for per-episode delta writes.
const DELTA_LOCK_NAMESPACE: i32 = 0x5DE1;

#[derive(Debug, Error)]
pub enum DeltaError {
    #[error("Episode {0} not found")]
    EpisodeNotFound(i32),

    #[error("{} user(s) have no rankings for this episode", .0.len())]
    UsersWithoutRankings(Vec<UserSummary>),

    #[error("Payout split error: {0}")]
    Split(#[from] SplitError),

    #[error("Bet {0} has non-positive odds")]
    InvalidOdds(Uuid),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for DeltaError {
    fn from(error: sqlx::Error) -> Self {
        Self::Storage(StorageError::Database(error))
    }
}

pub type Result<T> = std::result::Result<T, DeltaError>;

/// Everything the calculation reads for one episode.
#[derive(Debug, Clone, Default)]
pub struct EpisodeSnapshot {
    pub episode_number: i32,
    pub users: Vec<User>,
    pub star_ids: HashSet<i32>,
    pub rankings: Vec<Ranking>,
    pub events: Vec<ScoredEvent>,
    pub bets: Vec<BetWithAccepters>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedDelta {
    pub user_id: Uuid,
    pub delta: Decimal,
}

/// Users with no ranking row at all in `rankings`, in `users` order.
pub fn users_without_rankings(users: &[User], rankings: &[Ranking]) -> Vec<UserSummary> {
    let ranked: HashSet<Uuid> = rankings.iter().map(|r| r.user_id).collect();

    users
        .iter()
        .filter(|user| !ranked.contains(&user.user_id))
        .map(UserSummary::from)
        .collect()
}

/// Sum of event values per star. Events missing a star or a type score nothing.
pub fn star_event_totals(events: &[ScoredEvent]) -> HashMap<i32, i64> {
    let mut totals = HashMap::new();

    for event in events {
        if let (Some(star_id), Some(value)) = (event.star_id, event.value) {
            *totals.entry(star_id).or_insert(0) += i64::from(value);
        }
    }

    totals
}

/// Rank-weighted event points for one user's rankings.
///
/// Rankings of stars outside the episode's star set are skipped.
pub fn ranking_contribution<'r>(
    rankings: impl IntoIterator<Item = &'r Ranking>,
    star_ids: &HashSet<i32>,
    totals: &HashMap<i32, i64>,
    splits: &PayoutSplits,
    episode_number: i32,
) -> Result<i64> {
    let mut contribution = 0i64;

    for ranking in rankings {
        if !star_ids.contains(&ranking.star_id) {
            continue;
        }

        let multiplier = splits.multiplier_for(episode_number, ranking.rank)?;
        let points = totals.get(&ranking.star_id).copied().unwrap_or(0);
        contribution += points * multiplier;
    }

    Ok(contribution)
}

/// One user's share of one bet's settlement.
///
/// The proposer wins `maxLose × accepted / odds` or loses `maxLose × accepted`;
/// each accepter loses `maxLose / odds` or wins `maxLose`. Unresolved bets and
/// uninvolved users settle to zero.
pub fn settle_bet(user_id: Uuid, bet: &BetWithAccepters) -> Result<Decimal> {
    let Some(proposer_won) = bet.bet.won else {
        return Ok(Decimal::ZERO);
    };

    if !bet.involves(user_id) {
        return Ok(Decimal::ZERO);
    }
    let is_proposer = bet.bet.better_id == user_id;

    let odds = bet.bet.odds;
    if odds <= Decimal::ZERO {
        return Err(DeltaError::InvalidOdds(bet.bet.bet_id));
    }

    let stake = bet.bet.max_lose;
    let accepted = Decimal::from(bet.accepted_users.len());

    let amount = match (is_proposer, proposer_won) {
        (true, true) => (stake * accepted)
            .checked_div(odds)
            .ok_or(DeltaError::InvalidOdds(bet.bet.bet_id))?,
        (true, false) => -(stake * accepted),
        (false, true) => -stake
            .checked_div(odds)
            .ok_or(DeltaError::InvalidOdds(bet.bet.bet_id))?,
        (false, false) => stake,
    };

    Ok(amount)
}

pub fn bet_contribution(user_id: Uuid, bets: &[BetWithAccepters]) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for bet in bets {
        total += settle_bet(user_id, bet)?;
    }
    Ok(total)
}

/// Deltas for every user in the snapshot.
///
/// Fails before producing anything when the split table has no entry for the
/// episode, or, unless `force` is set, when some user has not ranked at all.
pub fn compute_episode_deltas(
    snapshot: &EpisodeSnapshot,
    splits: &PayoutSplits,
    force: bool,
) -> Result<Vec<ComputedDelta>> {
    splits.split_for(snapshot.episode_number)?;

    if !force {
        let missing = users_without_rankings(&snapshot.users, &snapshot.rankings);
        if !missing.is_empty() {
            return Err(DeltaError::UsersWithoutRankings(missing));
        }
    }

    let totals = star_event_totals(&snapshot.events);

    let mut by_user: HashMap<Uuid, Vec<&Ranking>> = HashMap::new();
    for ranking in &snapshot.rankings {
        by_user.entry(ranking.user_id).or_default().push(ranking);
    }

    snapshot
        .users
        .iter()
        .map(|user| -> Result<ComputedDelta> {
            let rankings = by_user.get(&user.user_id).into_iter().flatten().copied();
            let points = ranking_contribution(
                rankings,
                &snapshot.star_ids,
                &totals,
                splits,
                snapshot.episode_number,
            )?;
            let bets = bet_contribution(user.user_id, &snapshot.bets)?;

            Ok(ComputedDelta {
                user_id: user.user_id,
                delta: Decimal::from(points) + bets,
            })
        })
        .collect()
}

pub async fn load_snapshot(
    conn: &mut PgConnection,
    episode_number: i32,
) -> Result<EpisodeSnapshot> {
    let star_ids = EpisodeRepository::star_ids_on(conn, episode_number).await?;
    let users = UserRepository::list_on(conn).await?;
    let rankings = RankingRepository::list_for_episode_on(conn, episode_number).await?;
    let events = EventRepository::scored_events_on(conn, episode_number).await?;
    let bets = BetRepository::list_for_episode_on(conn, episode_number).await?;

    Ok(EpisodeSnapshot {
        episode_number,
        users,
        star_ids: star_ids.into_iter().collect(),
        rankings,
        events,
        bets,
    })
}

/// Opens the transaction a delta run works in and takes the episode's
/// advisory lock, held until the transaction commits or is dropped.
async fn lock_episode(
    pool: &PgPool,
    episode_number: i32,
) -> Result<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(DELTA_LOCK_NAMESPACE)
        .bind(episode_number)
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

async fn ensure_episode(conn: &mut PgConnection, episode_number: i32) -> Result<()> {
    match EpisodeRepository::find_by_number_on(conn, episode_number).await {
        Ok(_) => Ok(()),
        Err(StorageError::NotFound) => Err(DeltaError::EpisodeNotFound(episode_number)),
        Err(e) => Err(e.into()),
    }
}

/// Computes and stores every user's delta for the episode.
///
/// Runs are serialized per episode and use a single connection: the lock,
/// the reads and every upsert share one transaction, so a failed run leaves
/// the stored deltas as they were.
pub async fn calculate_deltas(
    pool: &PgPool,
    splits: &PayoutSplits,
    episode_number: i32,
    force: bool,
) -> Result<Vec<UserDelta>> {
    let mut tx = lock_episode(pool, episode_number).await?;

    ensure_episode(&mut *tx, episode_number).await?;

    let snapshot = load_snapshot(&mut *tx, episode_number).await?;
    let deltas = match compute_episode_deltas(&snapshot, splits, force) {
        Ok(deltas) => deltas,
        Err(DeltaError::UsersWithoutRankings(missing)) => {
            tracing::warn!(
                episode = episode_number,
                missing = missing.len(),
                "Delta calculation blocked by users without rankings"
            );
            return Err(DeltaError::UsersWithoutRankings(missing));
        }
        Err(e) => return Err(e),
    };

    let mut written = Vec::with_capacity(deltas.len());
    for computed in deltas {
        let row = UserDeltaRepository::upsert_on(
            &mut *tx,
            computed.user_id,
            episode_number,
            computed.delta,
        )
        .await?;
        written.push(row);
    }

    tx.commit().await?;

    tracing::info!(
        episode = episode_number,
        users = written.len(),
        force,
        "Calculated episode deltas"
    );

    Ok(written)
}

/// Removes every stored delta of the episode and returns how many were deleted.
pub async fn clear_deltas(pool: &PgPool, episode_number: i32) -> Result<u64> {
    let mut tx = lock_episode(pool, episode_number).await?;

    ensure_episode(&mut *tx, episode_number).await?;

    let removed = UserDeltaRepository::delete_for_episode_on(&mut *tx, episode_number).await?;

    tx.commit().await?;

    tracing::info!(episode = episode_number, removed, "Cleared episode deltas");

    Ok(removed)
}
