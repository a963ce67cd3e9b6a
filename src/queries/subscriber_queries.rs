use sqlx::PgPool;

use crate::{error::Result, models::Subscriber};

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Subscriber>> {
    let subscriber = sqlx::query_as::<_, Subscriber>(
        "SELECT id, email, created_at FROM subscribers WHERE LOWER(email) = LOWER($1) LIMIT 1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(subscriber)
}

pub async fn create(pool: &PgPool, email: &str) -> Result<Subscriber> {
    let subscriber = sqlx::query_as::<_, Subscriber>(
        "INSERT INTO subscribers (email) VALUES ($1) RETURNING id, email, created_at",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(subscriber)
}
