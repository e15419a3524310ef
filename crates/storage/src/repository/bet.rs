use std::collections::HashMap;

use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Bet, BetWithAccepters, NewBet};

#[derive(FromRow)]
struct ParticipantRow {
    bet_id: Uuid,
    user_id: Uuid,
    accepted: bool,
}

pub struct BetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BetRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, bet_id: Uuid) -> Result<BetWithAccepters> {
        let mut conn = self.pool.acquire().await?;

        let bet = sqlx::query_as::<_, Bet>(
            r#"
            SELECT bet_id, episode_number, better_id, description, odds, max_lose, won, created_at
            FROM bets
            WHERE bet_id = $1
            "#,
        )
        .bind(bet_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        let mut bets = Self::attach_participants(&mut *conn, vec![bet]).await?;
        bets.pop().ok_or(StorageError::NotFound)
    }

    pub async fn list_for_episode(&self, episode_number: i32) -> Result<Vec<BetWithAccepters>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_for_episode_on(&mut *conn, episode_number).await
    }

    pub async fn list_for_episode_on(
        conn: &mut PgConnection,
        episode_number: i32,
    ) -> Result<Vec<BetWithAccepters>> {
        let bets = sqlx::query_as::<_, Bet>(
            r#"
            SELECT bet_id, episode_number, better_id, description, odds, max_lose, won, created_at
            FROM bets
            WHERE episode_number = $1
            ORDER BY created_at
            "#,
        )
        .bind(episode_number)
        .fetch_all(&mut *conn)
        .await?;

        Self::attach_participants(conn, bets).await
    }

    /// Inserts the bet and its eligible users in one transaction.
    pub async fn create(&self, new_bet: &NewBet<'_>) -> Result<BetWithAccepters> {
        let mut tx = self.pool.begin().await?;

        let bet = sqlx::query_as::<_, Bet>(
            r#"
            INSERT INTO bets (episode_number, better_id, description, odds, max_lose)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING bet_id, episode_number, better_id, description, odds, max_lose, won, created_at
            "#,
        )
        .bind(new_bet.episode_number)
        .bind(new_bet.better_id)
        .bind(new_bet.description)
        .bind(new_bet.odds)
        .bind(new_bet.max_lose)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO bet_eligible_users (bet_id, user_id)
            SELECT $1, user_id FROM UNNEST($2::UUID[]) AS e(user_id)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(bet.bet_id)
        .bind(new_bet.eligible_users)
        .execute(&mut *tx)
        .await?;

        let mut bets = Self::attach_participants(&mut *tx, vec![bet]).await?;
        tx.commit().await?;

        bets.pop().ok_or(StorageError::NotFound)
    }

    /// Records `user_id` as an accepter. The insert only happens while the
    /// user is eligible and the bet is unresolved; returns whether a row was added.
    pub async fn accept(&self, bet_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO bet_accepted_users (bet_id, user_id)
            SELECT b.bet_id, e.user_id
            FROM bets b
            JOIN bet_eligible_users e ON e.bet_id = b.bet_id
            WHERE b.bet_id = $1 AND e.user_id = $2 AND b.won IS NULL
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(bet_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolves (or with `None`, un-resolves) a bet.
    pub async fn set_outcome(&self, bet_id: Uuid, won: Option<bool>) -> Result<BetWithAccepters> {
        let mut conn = self.pool.acquire().await?;

        let bet = sqlx::query_as::<_, Bet>(
            r#"
            UPDATE bets
            SET won = $2
            WHERE bet_id = $1
            RETURNING bet_id, episode_number, better_id, description, odds, max_lose, won, created_at
            "#,
        )
        .bind(bet_id)
        .bind(won)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        let mut bets = Self::attach_participants(&mut *conn, vec![bet]).await?;
        bets.pop().ok_or(StorageError::NotFound)
    }

    pub async fn delete(&self, bet_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM bets WHERE bet_id = $1")
            .bind(bet_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn attach_participants(
        conn: &mut PgConnection,
        bets: Vec<Bet>,
    ) -> Result<Vec<BetWithAccepters>> {
        if bets.is_empty() {
            return Ok(Vec::new());
        }

        let bet_ids: Vec<Uuid> = bets.iter().map(|bet| bet.bet_id).collect();
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT bet_id, user_id, TRUE AS accepted
            FROM bet_accepted_users
            WHERE bet_id = ANY($1)
            UNION ALL
            SELECT bet_id, user_id, FALSE AS accepted
            FROM bet_eligible_users
            WHERE bet_id = ANY($1)
            ORDER BY user_id
            "#,
        )
        .bind(&bet_ids)
        .fetch_all(conn)
        .await?;

        let mut accepted: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut eligible: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in rows {
            let target = if row.accepted {
                &mut accepted
            } else {
                &mut eligible
            };
            target.entry(row.bet_id).or_default().push(row.user_id);
        }

        Ok(bets
            .into_iter()
            .map(|bet| BetWithAccepters {
                eligible_users: eligible.remove(&bet.bet_id).unwrap_or_default(),
                accepted_users: accepted.remove(&bet.bet_id).unwrap_or_default(),
                bet,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::test_support;

    #[sqlx::test]
    async fn test_create_records_eligible_users(pool: PgPool) {
        let star = test_support::star(&pool, "Paul").await;
        test_support::episode(&pool, 1, &[star]).await;
        let proposer = test_support::user(&pool, "Alice").await;
        let bob = test_support::user(&pool, "Bob").await;
        let carol = test_support::user(&pool, "Carol").await;

        let repo = BetRepository::new(&pool);
        let eligible = [bob, carol];
        let bet = repo
            .create(&NewBet {
                episode_number: 1,
                better_id: proposer,
                description: "Someone cries in the tent",
                odds: Decimal::from(2),
                max_lose: Decimal::from(10),
                eligible_users: &eligible,
            })
            .await
            .unwrap();

        let mut expected = vec![bob, carol];
        expected.sort();
        assert_eq!(bet.eligible_users, expected);
        assert!(bet.accepted_users.is_empty());
        assert_eq!(bet.bet.won, None);

        let listed = repo.list_for_episode(1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].eligible_users, expected);
    }

    #[sqlx::test]
    async fn test_accept_requires_eligibility_and_open_bet(pool: PgPool) {
        let star = test_support::star(&pool, "Paul").await;
        test_support::episode(&pool, 1, &[star]).await;
        let proposer = test_support::user(&pool, "Alice").await;
        let bob = test_support::user(&pool, "Bob").await;
        let outsider = test_support::user(&pool, "Dave").await;

        let repo = BetRepository::new(&pool);
        let eligible = [bob];
        let bet = repo
            .create(&NewBet {
                episode_number: 1,
                better_id: proposer,
                description: "Bread proves in time",
                odds: Decimal::from(3),
                max_lose: Decimal::from(6),
                eligible_users: &eligible,
            })
            .await
            .unwrap();
        let bet_id = bet.bet.bet_id;

        assert!(!repo.accept(bet_id, outsider).await.unwrap());
        assert!(repo.accept(bet_id, bob).await.unwrap());
        assert!(!repo.accept(bet_id, bob).await.unwrap());
        assert_eq!(repo.find_by_id(bet_id).await.unwrap().accepted_users, vec![bob]);

        let resolved = repo
            .create(&NewBet {
                episode_number: 1,
                better_id: proposer,
                description: "Showstopper collapses",
                odds: Decimal::from(3),
                max_lose: Decimal::from(6),
                eligible_users: &eligible,
            })
            .await
            .unwrap()
            .bet
            .bet_id;
        repo.set_outcome(resolved, Some(true)).await.unwrap();
        assert!(!repo.accept(resolved, bob).await.unwrap());
    }

    #[sqlx::test]
    async fn test_delete_unknown_bet_is_not_found(pool: PgPool) {
        let repo = BetRepository::new(&pool);
        assert!(matches!(
            repo.delete(Uuid::new_v4()).await,
            Err(StorageError::NotFound)
        ));
    }
}
