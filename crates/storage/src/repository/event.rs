use sqlx::PgConnection;

use crate::error::Result;
use crate::models::ScoredEvent;

/// Events are only read by the delta calculation, inside its locked transaction.
pub struct EventRepository;

impl EventRepository {
    /// Every event of the episode with its event type's value, if any.
    pub async fn scored_events_on(
        conn: &mut PgConnection,
        episode_number: i32,
    ) -> Result<Vec<ScoredEvent>> {
        let events = sqlx::query_as::<_, ScoredEvent>(
            r#"
            SELECT e.event_id, e.star_id, et.value
            FROM events e
            LEFT JOIN event_types et ON et.event_type_id = e.event_type_id
            WHERE e.episode_number = $1
            "#,
        )
        .bind(episode_number)
        .fetch_all(conn)
        .await?;

        Ok(events)
    }
}
