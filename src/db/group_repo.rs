use crate::models::Group;
use sqlx::PgPool;

/// Create a group. Title and slug are globally unique; violations surface as
/// `sqlx::Error::Database` for the admin-style caller to report.
pub async fn create_group(
    pool: &PgPool,
    title: &str,
    slug: &str,
    description: &str,
) -> Result<Group, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        r#"
        INSERT INTO groups (title, slug, description)
        VALUES ($1, $2, $3)
        RETURNING id, title, slug, description
        "#,
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(pool)
    .await
}

/// Find a group by its URL slug
pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        r#"
        SELECT id, title, slug, description
        FROM groups
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

/// Check that a group id references an existing group
pub async fn exists(pool: &PgPool, group_id: i64) -> Result<bool, sqlx::Error> {
    let (found,): (bool,) =
        sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM groups WHERE id = $1)"#)
            .bind(group_id)
            .fetch_one(pool)
            .await?;

    Ok(found)
}

/// Delete a group. Its posts survive with `group_id` set to NULL by the
/// foreign key's referential action.
pub async fn delete_group(pool: &PgPool, group_id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(r#"DELETE FROM groups WHERE id = $1"#)
        .bind(group_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}
