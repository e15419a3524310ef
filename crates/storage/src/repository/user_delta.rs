use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::UserDelta;

pub struct UserDeltaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserDeltaRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Writes the delta for (user, episode), replacing any earlier value.
    pub async fn upsert_on(
        conn: &mut PgConnection,
        user_id: Uuid,
        episode_number: i32,
        delta: Decimal,
    ) -> Result<UserDelta> {
        let row = sqlx::query_as::<_, UserDelta>(
            r#"
            INSERT INTO user_deltas (user_id, episode_number, delta)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, episode_number)
            DO UPDATE SET
                delta = EXCLUDED.delta,
                computed_at = CURRENT_TIMESTAMP
            RETURNING user_id, episode_number, delta, computed_at
            "#,
        )
        .bind(user_id)
        .bind(episode_number)
        .bind(delta)
        .fetch_one(conn)
        .await?;

        Ok(row)
    }

    pub async fn delete_for_episode_on(
        conn: &mut PgConnection,
        episode_number: i32,
    ) -> Result<u64> {
        let result = sqlx::query("DELETE FROM user_deltas WHERE episode_number = $1")
            .bind(episode_number)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserDelta>> {
        let deltas = sqlx::query_as::<_, UserDelta>(
            r#"
            SELECT user_id, episode_number, delta, computed_at
            FROM user_deltas
            WHERE user_id = $1
            ORDER BY episode_number
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(deltas)
    }
}
