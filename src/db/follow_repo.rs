use crate::models::Follow;
use sqlx::PgPool;

/// Idempotent create follow; returns the new row, or None when the pair
/// already existed.
///
/// The `(user_id, author_id)` uniqueness constraint is the real guard under
/// concurrent requests; `ON CONFLICT DO NOTHING` turns a duplicate into a
/// no-op instead of a constraint error.
pub async fn create_follow(
    pool: &PgPool,
    user_id: i64,
    author_id: i64,
) -> Result<Option<Follow>, sqlx::Error> {
    sqlx::query_as::<_, Follow>(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, author_id) DO NOTHING
        RETURNING id, user_id, author_id, created_at
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await
}

/// Delete a follow; returns true if a row was removed.
pub async fn delete_follow(
    pool: &PgPool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        DELETE FROM follows
        WHERE user_id = $1 AND author_id = $2
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

/// Does `user_id` follow `author_id`?
pub async fn exists(pool: &PgPool, user_id: i64, author_id: i64) -> Result<bool, sqlx::Error> {
    let (found,): (bool,) = sqlx::query_as(
        r#"SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)"#,
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;

    Ok(found)
}
