/// Database access layer
///
/// One repository module per entity. Repositories are free functions over
/// `&PgPool` returning `sqlx::Error`; the handler layer maps absences to
/// NotFound. Listing queries eager-load related rows with JOINs so views
/// never issue per-row follow-up fetches.
pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod post_repo;
pub mod user_repo;
