/// Follow handlers: the subscription feed plus follow/unfollow actions
use crate::config::Config;
use crate::db::{follow_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::middleware::{MaybeUser, UserId};
use crate::pagination::PageRequest;
use crate::render;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use super::PageQuery;

/// Posts authored by anyone the viewer follows, newest first, paginated.
pub async fn follow_index(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    query: web::Query<PageQuery>,
    viewer: MaybeUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let UserId(viewer_id) = match viewer.0 {
        Some(id) => id,
        None => return Ok(render::login_redirect(&config.app.login_url, req.path())),
    };

    let total = post_repo::count_followed(&pool, viewer_id).await?;
    let page_req = PageRequest::resolve(query.page.as_deref(), total);
    let posts =
        post_repo::list_followed(&pool, viewer_id, page_req.limit(), page_req.offset()).await?;

    let context = json!({
        "title": "Your subscriptions",
        "page_obj": page_req.into_page(posts),
    });

    Ok(render::render_page("posts/follow.html", &context))
}

/// Follow an author. Following yourself or someone you already follow is a
/// no-op; the unique constraint absorbs duplicate inserts under races.
/// Redirects to the author's profile regardless of outcome.
pub async fn profile_follow(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    username: web::Path<String>,
    viewer: MaybeUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let UserId(viewer_id) = match viewer.0 {
        Some(id) => id,
        None => return Ok(render::login_redirect(&config.app.login_url, req.path())),
    };

    let author = user_repo::find_by_username(&pool, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

    if author.id != viewer_id {
        follow_repo::create_follow(&pool, viewer_id, author.id).await?;
    }

    Ok(render::redirect(&format!("/profile/{}/", author.username)))
}

/// Unfollow an author. 404 when the follow relationship does not exist;
/// otherwise delete it and redirect to the author's profile.
pub async fn profile_unfollow(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    username: web::Path<String>,
    viewer: MaybeUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let UserId(viewer_id) = match viewer.0 {
        Some(id) => id,
        None => return Ok(render::login_redirect(&config.app.login_url, req.path())),
    };

    let author = user_repo::find_by_username(&pool, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

    let removed = follow_repo::delete_follow(&pool, viewer_id, author.id).await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "follow of '{}' by user {}",
            author.username, viewer_id
        )));
    }

    Ok(render::redirect(&format!("/profile/{}/", author.username)))
}
