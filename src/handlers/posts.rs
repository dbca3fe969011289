/// Post handlers: listings, detail, create and edit
use crate::cache::IndexCache;
use crate::config::Config;
use crate::db::{comment_repo, follow_repo, group_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::forms::{validate_post_form, FormErrors, PostDraft, RawPostForm};
use crate::middleware::{MaybeUser, UserId};
use crate::pagination::PageRequest;
use crate::render;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use super::PageQuery;

/// All posts, newest first, paginated. The rendered payload of the default
/// page is served from the index cache until a post write clears it;
/// explicit `page` requests bypass the cache.
pub async fn index(
    pool: web::Data<PgPool>,
    cache: web::Data<IndexCache>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let default_page = query.page.is_none();

    if default_page {
        if let Some(payload) = cache.get().await {
            return Ok(render::render_cached(payload));
        }
    }

    let total = post_repo::count_all(&pool).await?;
    let page_req = PageRequest::resolve(query.page.as_deref(), total);
    let posts = post_repo::list_recent(&pool, page_req.limit(), page_req.offset()).await?;
    let page = page_req.into_page(posts);

    let context = json!({
        "title": "Latest updates on the site",
        "page_obj": page,
    });
    let payload = render::render_payload("posts/index.html", &context);

    if default_page {
        cache.put(&payload).await;
    }

    Ok(render::render_cached(payload))
}

/// A group's posts, paginated. 404 on unknown slug.
pub async fn group_posts(
    pool: web::Data<PgPool>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let group = group_repo::find_by_slug(&pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

    let total = post_repo::count_by_group(&pool, group.id).await?;
    let page_req = PageRequest::resolve(query.page.as_deref(), total);
    let posts =
        post_repo::list_by_group(&pool, group.id, page_req.limit(), page_req.offset()).await?;

    let context = json!({
        "title": format!("Posts of community {}", group),
        "group": group,
        "page_obj": page_req.into_page(posts),
    });

    Ok(render::render_page("posts/group_list.html", &context))
}

/// An author's profile: their posts plus whether the viewer follows them.
/// The flag is false for anonymous viewers. 404 on unknown username.
pub async fn profile(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
    viewer: MaybeUser,
) -> Result<HttpResponse> {
    let author = user_repo::find_by_username(&pool, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

    let following = match viewer.0 {
        Some(UserId(viewer_id)) => follow_repo::exists(&pool, viewer_id, author.id).await?,
        None => false,
    };

    let total = post_repo::count_by_author(&pool, author.id).await?;
    let page_req = PageRequest::resolve(query.page.as_deref(), total);
    let posts =
        post_repo::list_by_author(&pool, author.id, page_req.limit(), page_req.offset()).await?;

    let context = json!({
        "title": format!("Profile of user {}", author.username),
        "author": author,
        "following": following,
        "page_obj": page_req.into_page(posts),
    });

    Ok(render::render_page("posts/profile.html", &context))
}

/// A single post with its comments (insertion order) and an empty comment
/// form. 404 on unknown id.
pub async fn post_detail(pool: web::Data<PgPool>, post_id: web::Path<i64>) -> Result<HttpResponse> {
    let post = post_repo::find_with_related(&pool, *post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

    let comments = comment_repo::list_for_post(&pool, post.id).await?;
    let title_preview: String = post.text.chars().take(30).collect();

    let context = json!({
        "title": format!("Post {}", title_preview),
        "post": post,
        "comments": comments,
        "comment_form": empty_comment_form(),
    });

    Ok(render::render_page("posts/post_detail.html", &context))
}

/// GET half of post creation: the empty form, behind the login redirect.
pub async fn post_create_form(
    config: web::Data<Config>,
    viewer: MaybeUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if viewer.0.is_none() {
        return Ok(render::login_redirect(&config.app.login_url, req.path()));
    }

    let context = json!({ "form": empty_post_form() });
    Ok(render::render_page("posts/create_post.html", &context))
}

/// POST half of post creation. On success: persist with the viewer as
/// author, clear the index cache, redirect to the viewer's profile. On
/// validation failure: re-render the form with field errors.
pub async fn post_create_submit(
    pool: web::Data<PgPool>,
    cache: web::Data<IndexCache>,
    config: web::Data<Config>,
    viewer: MaybeUser,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let UserId(viewer_id) = match viewer.0 {
        Some(id) => id,
        None => return Ok(render::login_redirect(&config.app.login_url, req.path())),
    };

    let form: RawPostForm = super::parse_form(&body);
    let draft = match validated_draft(&pool, &form).await? {
        Ok(draft) => draft,
        Err(errors) => return Ok(render_post_form(&form, &errors, false)),
    };

    post_repo::create_post(
        &pool,
        viewer_id,
        &draft.text,
        draft.group_id,
        draft.image.as_deref(),
    )
    .await?;

    cache.invalidate().await?;

    let author = user_repo::find_by_id(&pool, viewer_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("authenticated user {} missing", viewer_id)))?;

    Ok(render::redirect(&format!("/profile/{}/", author.username)))
}

/// GET half of post editing. Only the author may edit; anyone else is
/// silently redirected to the detail page.
pub async fn post_edit_form(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    post_id: web::Path<i64>,
    viewer: MaybeUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let UserId(viewer_id) = match viewer.0 {
        Some(id) => id,
        None => return Ok(render::login_redirect(&config.app.login_url, req.path())),
    };

    let post = post_repo::find_post_by_id(&pool, *post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

    if post.author_id != viewer_id {
        return Ok(render::redirect(&format!("/posts/{}/", post.id)));
    }

    let context = json!({
        "form": {
            "values": {
                "text": post.text,
                "group": post.group_id.map(|id| id.to_string()),
                "image": post.image,
            },
            "errors": FormErrors::default(),
        },
        "post_id": post.id,
        "is_edit": true,
    });

    Ok(render::render_page("posts/create_post.html", &context))
}

/// POST half of post editing. Updates text/group/image only; `pub_date`
/// never changes. Clears the index cache on success.
pub async fn post_edit_submit(
    pool: web::Data<PgPool>,
    cache: web::Data<IndexCache>,
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

    if post.author_id != viewer_id {
        return Ok(render::redirect(&format!("/posts/{}/", post.id)));
    }

    let form: RawPostForm = super::parse_form(&body);
    let draft = match validated_draft(&pool, &form).await? {
        Ok(draft) => draft,
        Err(errors) => return Ok(render_post_form(&form, &errors, true)),
    };

    post_repo::update_post(
        &pool,
        post.id,
        &draft.text,
        draft.group_id,
        draft.image.as_deref(),
    )
    .await?;

    cache.invalidate().await?;

    Ok(render::redirect(&format!("/posts/{}/", post.id)))
}

/// Run the pure form validation, then fold a dangling group reference into
/// the same field-error shape.
async fn validated_draft(
    pool: &PgPool,
    form: &RawPostForm,
) -> Result<std::result::Result<PostDraft, FormErrors>> {
    let draft = match validate_post_form(form) {
        Ok(draft) => draft,
        Err(errors) => return Ok(Err(errors)),
    };

    if let Some(group_id) = draft.group_id {
        if !group_repo::exists(pool, group_id).await? {
            let mut errors = FormErrors::default();
            errors.add("group", "Select a valid group.");
            return Ok(Err(errors));
        }
    }

    Ok(Ok(draft))
}

fn render_post_form(form: &RawPostForm, errors: &FormErrors, is_edit: bool) -> HttpResponse {
    let context = json!({
        "form": {
            "values": {
                "text": form.text.as_deref(),
                "group": form.group.as_deref(),
                "image": form.image.as_deref(),
            },
            "errors": errors,
        },
        "is_edit": is_edit,
    });

    render::render_page("posts/create_post.html", &context)
}

fn empty_post_form() -> serde_json::Value {
    json!({
        "values": { "text": "", "group": null, "image": null },
        "errors": FormErrors::default(),
    })
}

fn empty_comment_form() -> serde_json::Value {
    json!({
        "values": { "text": "" },
        "errors": FormErrors::default(),
    })
}
