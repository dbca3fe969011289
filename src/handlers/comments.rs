/// Comment handler
use crate::config::Config;
use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::forms::{validate_comment_form, RawCommentForm};
use crate::middleware::{MaybeUser, UserId};
use crate::render;
use actix_web::{web, HttpRequest, HttpResponse};
use sqlx::PgPool;
use tracing::debug;

/// Add a comment to a post, then return to the detail page.
///
/// An invalid submission also redirects to the detail page without
/// persisting anything; the drop is logged but not surfaced to the user.
/// 404 on unknown post.
pub async fn add_comment(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    post_id: web::Path<i64>,
    viewer: MaybeUser,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let UserId(viewer_id) = match viewer.0 {
        Some(id) => id,
        None => return Ok(render::login_redirect(&config.app.login_url, req.path())),
    };

    let post = post_repo::find_post_by_id(&pool, *post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

    let form: RawCommentForm = super::parse_form(&body);
    match validate_comment_form(&form) {
        Ok(text) => {
            comment_repo::create_comment(&pool, post.id, viewer_id, &text).await?;
        }
        Err(errors) => {
            debug!(
                post_id = post.id,
                user_id = viewer_id,
                ?errors,
                "dropping invalid comment submission"
            );
        }
    }

    Ok(render::redirect(&format!("/posts/{}/", post.id)))
}
