use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::Ranking;

pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_episode(&self, episode_number: i32) -> Result<Vec<Ranking>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_for_episode_on(&mut *conn, episode_number).await
    }

    pub async fn list_for_episode_on(
        conn: &mut PgConnection,
        episode_number: i32,
    ) -> Result<Vec<Ranking>> {
        let rankings = sqlx::query_as::<_, Ranking>(
            r#"
            SELECT ranking_id, user_id, star_id, episode_number, rank
            FROM rankings
            WHERE episode_number = $1
            ORDER BY user_id, rank
            "#,
        )
        .bind(episode_number)
        .fetch_all(conn)
        .await?;

        Ok(rankings)
    }

    pub async fn list_for_user(&self, user_id: Uuid, episode_number: i32) -> Result<Vec<Ranking>> {
        let rankings = sqlx::query_as::<_, Ranking>(
            r#"
            SELECT ranking_id, user_id, star_id, episode_number, rank
            FROM rankings
            WHERE user_id = $1 AND episode_number = $2
            ORDER BY rank
            "#,
        )
        .bind(user_id)
        .bind(episode_number)
        .fetch_all(self.pool)
        .await?;

        Ok(rankings)
    }

    /// Replaces the user's rankings for the episode with `entries`
    /// (`(star_id, rank)` pairs) in one transaction.
    pub async fn replace_for_user(
        &self,
        user_id: Uuid,
        episode_number: i32,
        entries: &[(i32, i32)],
    ) -> Result<Vec<Ranking>> {
        let (star_ids, ranks): (Vec<i32>, Vec<i32>) = entries.iter().copied().unzip();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM rankings WHERE user_id = $1 AND episode_number = $2")
            .bind(user_id)
            .bind(episode_number)
            .execute(&mut *tx)
            .await?;

        let mut rankings = sqlx::query_as::<_, Ranking>(
            r#"
            INSERT INTO rankings (user_id, star_id, episode_number, rank)
            SELECT $1, s.star_id, $2, s.rank
            FROM UNNEST($3::INTEGER[], $4::INTEGER[]) AS s(star_id, rank)
            RETURNING ranking_id, user_id, star_id, episode_number, rank
            "#,
        )
        .bind(user_id)
        .bind(episode_number)
        .bind(&star_ids)
        .bind(&ranks)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        rankings.sort_by_key(|ranking| ranking.rank);
        Ok(rankings)
    }

    /// Seeds default rankings (stars ordered by id) for every (user, episode)
    /// pair that has none yet. Episodes without stars are left alone.
    pub async fn backfill_defaults(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO rankings (user_id, star_id, episode_number, rank)
            SELECT u.user_id,
                   es.star_id,
                   es.episode_number,
                   ROW_NUMBER() OVER (
                       PARTITION BY u.user_id, es.episode_number
                       ORDER BY es.star_id
                   )::INTEGER
            FROM users u
            CROSS JOIN episode_stars es
            WHERE NOT EXISTS (
                SELECT 1 FROM rankings r
                WHERE r.user_id = u.user_id
                  AND r.episode_number = es.episode_number
            )
            ON CONFLICT (user_id, star_id, episode_number) DO NOTHING
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
