//! Seed helpers for `#[sqlx::test]` databases.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn user(pool: &PgPool, first_name: &str) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO users (first_name, last_name, email)
        VALUES ($1, 'Baker', $2)
        RETURNING user_id
        "#,
    )
    .bind(first_name)
    .bind(format!("{}-{}@example.com", first_name.to_lowercase(), Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn star(pool: &PgPool, first_name: &str) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO stars (first_name, last_name)
        VALUES ($1, 'Hollywood')
        RETURNING star_id
        "#,
    )
    .bind(first_name)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Inserts the episode row and its star set, without rankings.
pub async fn episode(pool: &PgPool, number: i32, star_ids: &[i32]) {
    sqlx::query("INSERT INTO episodes (number) VALUES ($1)")
        .bind(number)
        .execute(pool)
        .await
        .unwrap();

    sqlx::query(
        r#"
        INSERT INTO episode_stars (episode_number, star_id)
        SELECT $1, star_id FROM UNNEST($2::INTEGER[]) AS s(star_id)
        "#,
    )
    .bind(number)
    .bind(star_ids)
    .execute(pool)
    .await
    .unwrap();
}

/// Ranks `star_ids` for the user in the given order, best first.
pub async fn rank(pool: &PgPool, user_id: Uuid, episode_number: i32, star_ids: &[i32]) {
    sqlx::query(
        r#"
        INSERT INTO rankings (user_id, star_id, episode_number, rank)
        SELECT $1, s.star_id, $2, s.position::INTEGER
        FROM UNNEST($3::INTEGER[]) WITH ORDINALITY AS s(star_id, position)
        "#,
    )
    .bind(user_id)
    .bind(episode_number)
    .bind(star_ids)
    .execute(pool)
    .await
    .unwrap();
}

/// Adds an event for the star worth `value` points, with its own event type.
pub async fn event(pool: &PgPool, episode_number: i32, star_id: i32, value: i32) {
    let event_type_id: i32 = sqlx::query_scalar(
        "INSERT INTO event_types (name, value) VALUES ($1, $2) RETURNING event_type_id",
    )
    .bind(format!("event-{}", Uuid::new_v4()))
    .bind(value)
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        INSERT INTO events (episode_number, star_id, event_type_id, description)
        VALUES ($1, $2, $3, 'Star baker')
        "#,
    )
    .bind(episode_number)
    .bind(star_id)
    .bind(event_type_id)
    .execute(pool)
    .await
    .unwrap();
}

/// A bet with `accepted` as both its eligible and accepted users.
pub async fn bet(
    pool: &PgPool,
    episode_number: i32,
    better_id: Uuid,
    accepted: &[Uuid],
    odds: i64,
    max_lose: i64,
    won: Option<bool>,
) -> Uuid {
    let bet_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO bets (episode_number, better_id, description, odds, max_lose, won)
        VALUES ($1, $2, 'Soggy bottom', $3, $4, $5)
        RETURNING bet_id
        "#,
    )
    .bind(episode_number)
    .bind(better_id)
    .bind(Decimal::from(odds))
    .bind(Decimal::from(max_lose))
    .bind(won)
    .fetch_one(pool)
    .await
    .unwrap();

    for table in ["bet_eligible_users", "bet_accepted_users"] {
        sqlx::query(&format!(
            "INSERT INTO {table} (bet_id, user_id) SELECT $1, user_id FROM UNNEST($2::UUID[]) AS a(user_id)"
        ))
        .bind(bet_id)
        .bind(accepted)
        .execute(pool)
        .await
        .unwrap();
    }

    bet_id
}

pub async fn delta_rows(pool: &PgPool, episode_number: i32) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_deltas WHERE episode_number = $1")
        .bind(episode_number)
        .fetch_one(pool)
        .await
        .unwrap()
}
