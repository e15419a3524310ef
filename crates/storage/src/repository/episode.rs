use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Episode;

/// Repository for Episode and EpisodeStar database operations
pub struct EpisodeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EpisodeRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Episode>> {
        let episodes = sqlx::query_as::<_, Episode>(
            r#"
            SELECT number, has_aired, current, created_at
            FROM episodes
            ORDER BY number
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(episodes)
    }

    pub async fn find_by_number(&self, number: i32) -> Result<Episode> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_number_on(&mut *conn, number).await
    }

    pub async fn find_by_number_on(conn: &mut PgConnection, number: i32) -> Result<Episode> {
        let episode = sqlx::query_as::<_, Episode>(
            r#"
            SELECT number, has_aired, current, created_at
            FROM episodes
            WHERE number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(episode)
    }

    /// The highest-numbered episode, which new bets default to.
    pub async fn find_latest(&self) -> Result<Option<Episode>> {
        let episode = sqlx::query_as::<_, Episode>(
            r#"
            SELECT number, has_aired, current, created_at
            FROM episodes
            ORDER BY number DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(episode)
    }

    pub async fn find_current(&self) -> Result<Option<Episode>> {
        let episode = sqlx::query_as::<_, Episode>(
            r#"
            SELECT number, has_aired, current, created_at
            FROM episodes
            WHERE current
            "#,
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(episode)
    }

    /// Makes `number` the only current episode.
    ///
    /// Writers are serialized by a table lock and both flag updates commit
    /// together, so readers see either the old or the new current episode.
    pub async fn set_current(&self, number: i32) -> Result<Episode> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE episodes IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        sqlx::query("SELECT number FROM episodes WHERE number = $1")
            .bind(number)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StorageError::NotFound)?;

        sqlx::query("UPDATE episodes SET current = FALSE WHERE current AND number <> $1")
            .bind(number)
            .execute(&mut *tx)
            .await?;

        let episode = sqlx::query_as::<_, Episode>(
            r#"
            UPDATE episodes
            SET current = TRUE
            WHERE number = $1
            RETURNING number, has_aired, current, created_at
            "#,
        )
        .bind(number)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(episode)
    }

    /// Star ids eligible for ranking in the episode.
    pub async fn star_ids(&self, number: i32) -> Result<Vec<i32>> {
        let mut conn = self.pool.acquire().await?;
        Self::star_ids_on(&mut *conn, number).await
    }

    pub async fn star_ids_on(conn: &mut PgConnection, number: i32) -> Result<Vec<i32>> {
        let ids = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT star_id
            FROM episode_stars
            WHERE episode_number = $1
            ORDER BY star_id
            "#,
        )
        .bind(number)
        .fetch_all(conn)
        .await?;

        Ok(ids)
    }

    /// Stars a new episode `number` inherits: those of the latest earlier episode,
    /// or every active star when there is no earlier episode.
    pub async fn carried_star_ids(&self, number: i32) -> Result<Vec<i32>> {
        let previous = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT number
            FROM episodes
            WHERE number < $1
            ORDER BY number DESC
            LIMIT 1
            "#,
        )
        .bind(number)
        .fetch_optional(self.pool)
        .await?;

        match previous {
            Some(previous) => self.star_ids(previous).await,
            None => {
                let ids = sqlx::query_scalar::<_, i32>(
                    "SELECT star_id FROM stars WHERE active ORDER BY star_id",
                )
                .fetch_all(self.pool)
                .await?;
                Ok(ids)
            }
        }
    }

    /// Inserts the episode, its star set and a default ranking per user
    /// (stars in the given order, rank = position) in one transaction.
    pub async fn create(
        &self,
        number: i32,
        has_aired: bool,
        star_ids: &[i32],
        user_ids: &[Uuid],
    ) -> Result<Episode> {
        let mut tx = self.pool.begin().await?;

        let episode = sqlx::query_as::<_, Episode>(
            r#"
            INSERT INTO episodes (number, has_aired)
            VALUES ($1, $2)
            RETURNING number, has_aired, current, created_at
            "#,
        )
        .bind(number)
        .bind(has_aired)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let error = StorageError::from(e);
            if error.is_unique_violation() {
                StorageError::ConstraintViolation(format!("Episode {number} already exists"))
            } else {
                error
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO episode_stars (episode_number, star_id)
            SELECT $1, star_id FROM UNNEST($2::INTEGER[]) AS s(star_id)
            "#,
        )
        .bind(number)
        .bind(star_ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO rankings (user_id, star_id, episode_number, rank)
            SELECT u.user_id, s.star_id, $1, s.position::INTEGER
            FROM UNNEST($2::UUID[]) AS u(user_id)
            CROSS JOIN UNNEST($3::INTEGER[]) WITH ORDINALITY AS s(star_id, position)
            ON CONFLICT (user_id, star_id, episode_number) DO NOTHING
            "#,
        )
        .bind(number)
        .bind(user_ids)
        .bind(star_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(episode)
    }
}
