use crate::models::{Post, PostWithRelated};
use sqlx::PgPool;

const RELATED_COLUMNS: &str = r#"
    p.id, p.text, p.pub_date, p.image,
    p.author_id, u.username AS author_username,
    p.group_id, g.title AS group_title, g.slug AS group_slug
"#;

/// Create a new post. `pub_date` is assigned by the database at insert time
/// and never touched again.
pub async fn create_post(
    pool: &PgPool,
    author_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (text, author_id, group_id, image)
        VALUES ($1, $2, $3, $4)
        RETURNING id, text, pub_date, author_id, group_id, image
        "#,
    )
    .bind(text)
    .bind(author_id)
    .bind(group_id)
    .bind(image)
    .fetch_one(pool)
    .await
}

/// Bulk-insert posts for one author; returns the number of rows created.
pub async fn create_posts_bulk(
    pool: &PgPool,
    author_id: i64,
    texts: &[String],
) -> Result<u64, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        INSERT INTO posts (text, author_id)
        SELECT t, $1 FROM UNNEST($2::text[]) AS t
        "#,
    )
    .bind(author_id)
    .bind(texts)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected)
}

/// Find a post by primary key
pub async fn find_post_by_id(pool: &PgPool, post_id: i64) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, text, pub_date, author_id, group_id, image
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Find a post by primary key with author and group eager-loaded
pub async fn find_with_related(
    pool: &PgPool,
    post_id: i64,
) -> Result<Option<PostWithRelated>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {RELATED_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN groups g ON g.id = p.group_id
        WHERE p.id = $1
        "#
    );

    sqlx::query_as::<_, PostWithRelated>(&query)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Update a post's editable fields. `pub_date` is immutable by contract, so
/// it is deliberately absent from the SET list.
pub async fn update_post(
    pool: &PgPool,
    post_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE posts
        SET text = $1, group_id = $2, image = $3
        WHERE id = $4
        "#,
    )
    .bind(text)
    .bind(group_id)
    .bind(image)
    .bind(post_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a post; its comments go with it via the cascade.
pub async fn delete_post(pool: &PgPool, post_id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(r#"DELETE FROM posts WHERE id = $1"#)
        .bind(post_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

/// Count all posts
pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM posts"#)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// All posts, newest first, author and group eager-loaded
pub async fn list_recent(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithRelated>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {RELATED_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN groups g ON g.id = p.group_id
        ORDER BY p.pub_date DESC, p.id DESC
        LIMIT $1 OFFSET $2
        "#
    );

    sqlx::query_as::<_, PostWithRelated>(&query)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Count posts filed under a group
pub async fn count_by_group(pool: &PgPool, group_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM posts WHERE group_id = $1"#)
        .bind(group_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// A group's posts, newest first
pub async fn list_by_group(
    pool: &PgPool,
    group_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithRelated>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {RELATED_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN groups g ON g.id = p.group_id
        WHERE p.group_id = $1
        ORDER BY p.pub_date DESC, p.id DESC
        LIMIT $2 OFFSET $3
        "#
    );

    sqlx::query_as::<_, PostWithRelated>(&query)
        .bind(group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Count posts by an author
pub async fn count_by_author(pool: &PgPool, author_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM posts WHERE author_id = $1"#)
        .bind(author_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// An author's posts, newest first
pub async fn list_by_author(
    pool: &PgPool,
    author_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithRelated>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {RELATED_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN groups g ON g.id = p.group_id
        WHERE p.author_id = $1
        ORDER BY p.pub_date DESC, p.id DESC
        LIMIT $2 OFFSET $3
        "#
    );

    sqlx::query_as::<_, PostWithRelated>(&query)
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Count posts authored by anyone `user_id` follows
pub async fn count_followed(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM posts p
        JOIN follows f ON f.author_id = p.author_id
        WHERE f.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Posts authored by anyone `user_id` follows, newest first
pub async fn list_followed(
    pool: &PgPool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithRelated>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {RELATED_COLUMNS}
        FROM posts p
        JOIN follows f ON f.author_id = p.author_id
        JOIN users u ON u.id = p.author_id
        LEFT JOIN groups g ON g.id = p.group_id
        WHERE f.user_id = $1
        ORDER BY p.pub_date DESC, p.id DESC
        LIMIT $2 OFFSET $3
        "#
    );

    sqlx::query_as::<_, PostWithRelated>(&query)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}
