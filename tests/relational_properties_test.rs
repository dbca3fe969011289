//! Relational invariants exercised against a live PostgreSQL instance.
//!
//! Ignored by default; run with a throwaway database:
//!
//! ```sh
//! DATABASE_URL=postgresql://localhost/blog_test cargo test -- --ignored
//! ```
//!
//! Each test creates its own uniquely named rows, so the suite can run
//! repeatedly against the same database. The handler-level tests also need
//! a reachable Redis (`REDIS_URL`, default `redis://localhost:6379`).

use actix_web::http::header::LOCATION;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use blog_service::cache::IndexCache;
use blog_service::config::Config;
use blog_service::db::{comment_repo, follow_repo, group_repo, post_repo, user_repo};
use blog_service::handlers;
use blog_service::middleware::{IdentityMiddleware, USER_ID_HEADER};
use blog_service::models::User;
use blog_service::pagination::PageRequest;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SEQ: AtomicU32 = AtomicU32::new(0);

fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    format!(
        "{}-{}-{}-{}",
        prefix,
        std::process::id(),
        nanos,
        SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

async fn connect() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must point at a throwaway database for ignored tests");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");
    pool
}

async fn create_user(pool: &PgPool, prefix: &str) -> User {
    let username = unique(prefix);
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username) VALUES ($1) RETURNING id, username",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .expect("insert user")
}

async fn follow_count(pool: &PgPool, user_id: i64, author_id: i64) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .fetch_one(pool)
            .await
            .expect("count follows");
    count
}

#[tokio::test]
#[ignore]
async fn following_twice_leaves_exactly_one_row() {
    let pool = connect().await;
    let follower = create_user(&pool, "follower").await;
    let author = create_user(&pool, "author").await;

    let created = follow_repo::create_follow(&pool, follower.id, author.id)
        .await
        .unwrap()
        .expect("first follow inserts a row");
    assert_eq!(created.user_id, follower.id);
    assert_eq!(created.author_id, author.id);

    assert!(follow_repo::create_follow(&pool, follower.id, author.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(follow_count(&pool, follower.id, author.id).await, 1);
}

#[tokio::test]
#[ignore]
async fn unfollowing_a_missing_relationship_reports_absence() {
    let pool = connect().await;
    let follower = create_user(&pool, "follower").await;
    let author = create_user(&pool, "author").await;

    assert!(!follow_repo::delete_follow(&pool, follower.id, author.id)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore]
async fn deleting_a_group_detaches_but_keeps_its_posts() {
    let pool = connect().await;
    let author = create_user(&pool, "author").await;
    let group = group_repo::create_group(&pool, &unique("title"), &unique("slug"), "desc")
        .await
        .unwrap();

    let post = post_repo::create_post(&pool, author.id, "grouped post", Some(group.id), None)
        .await
        .unwrap();
    assert_eq!(post.group_id, Some(group.id));

    assert!(group_repo::delete_group(&pool, group.id).await.unwrap());

    let survivor = post_repo::find_post_by_id(&pool, post.id)
        .await
        .unwrap()
        .expect("post survives group deletion");
    assert_eq!(survivor.group_id, None);
}

#[tokio::test]
#[ignore]
async fn deleting_a_user_cascades_posts_comments_and_follows() {
    let pool = connect().await;
    let doomed = create_user(&pool, "doomed").await;
    let other = create_user(&pool, "other").await;

    let own_post = post_repo::create_post(&pool, doomed.id, "mine", None, None)
        .await
        .unwrap();
    let other_post = post_repo::create_post(&pool, other.id, "theirs", None, None)
        .await
        .unwrap();
    let own_comment = comment_repo::create_comment(&pool, other_post.id, doomed.id, "hi")
        .await
        .unwrap();
    follow_repo::create_follow(&pool, doomed.id, other.id)
        .await
        .unwrap();
    follow_repo::create_follow(&pool, other.id, doomed.id)
        .await
        .unwrap();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(doomed.id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(post_repo::find_post_by_id(&pool, own_post.id)
        .await
        .unwrap()
        .is_none());
    let remaining = comment_repo::list_for_post(&pool, other_post.id).await.unwrap();
    assert!(remaining.iter().all(|c| c.id != own_comment.id));
    assert_eq!(follow_count(&pool, doomed.id, other.id).await, 0);
    assert_eq!(follow_count(&pool, other.id, doomed.id).await, 0);
}

#[tokio::test]
#[ignore]
async fn deleting_a_post_cascades_its_comments() {
    let pool = connect().await;
    let author = create_user(&pool, "author").await;
    let post = post_repo::create_post(&pool, author.id, "soon gone", None, None)
        .await
        .unwrap();
    comment_repo::create_comment(&pool, post.id, author.id, "first")
        .await
        .unwrap();

    assert!(post_repo::delete_post(&pool, post.id).await.unwrap());

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE post_id = $1")
        .bind(post.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore]
async fn a_post_never_appears_under_another_group() {
    let pool = connect().await;
    let author = create_user(&pool, "author").await;
    let group_a = group_repo::create_group(&pool, &unique("a"), &unique("a"), "a")
        .await
        .unwrap();
    let group_b = group_repo::create_group(&pool, &unique("b"), &unique("b"), "b")
        .await
        .unwrap();

    let post = post_repo::create_post(&pool, author.id, "filed under a", Some(group_a.id), None)
        .await
        .unwrap();

    let in_a = post_repo::list_by_group(&pool, group_a.id, 10, 0).await.unwrap();
    assert!(in_a.iter().any(|p| p.id == post.id));

    let in_b = post_repo::list_by_group(&pool, group_b.id, 10, 0).await.unwrap();
    assert!(in_b.iter().all(|p| p.id != post.id));
}

#[tokio::test]
#[ignore]
async fn thirteen_posts_paginate_ten_then_three_then_clamp() {
    let pool = connect().await;
    let author = create_user(&pool, "prolific").await;
    let texts: Vec<String> = (0..13).map(|i| format!("post number {i}")).collect();
    assert_eq!(
        post_repo::create_posts_bulk(&pool, author.id, &texts)
            .await
            .unwrap(),
        13
    );

    let total = post_repo::count_by_author(&pool, author.id).await.unwrap();
    assert_eq!(total, 13);

    let first = PageRequest::resolve(Some("1"), total);
    let items = post_repo::list_by_author(&pool, author.id, first.limit(), first.offset())
        .await
        .unwrap();
    assert_eq!(items.len(), 10);

    let second = PageRequest::resolve(Some("2"), total);
    let items = post_repo::list_by_author(&pool, author.id, second.limit(), second.offset())
        .await
        .unwrap();
    assert_eq!(items.len(), 3);

    // Page 3 clamps to page 2's window.
    let clamped = PageRequest::resolve(Some("3"), total);
    assert_eq!(clamped.offset(), second.offset());
}

#[tokio::test]
#[ignore]
async fn listings_are_newest_first_and_comments_in_insertion_order() {
    let pool = connect().await;
    let author = create_user(&pool, "author").await;
    let older = post_repo::create_post(&pool, author.id, "older", None, None)
        .await
        .unwrap();
    let newer = post_repo::create_post(&pool, author.id, "newer", None, None)
        .await
        .unwrap();

    let listed = post_repo::list_by_author(&pool, author.id, 10, 0).await.unwrap();
    let older_pos = listed.iter().position(|p| p.id == older.id).unwrap();
    let newer_pos = listed.iter().position(|p| p.id == newer.id).unwrap();
    assert!(newer_pos < older_pos);

    comment_repo::create_comment(&pool, newer.id, author.id, "first")
        .await
        .unwrap();
    comment_repo::create_comment(&pool, newer.id, author.id, "second")
        .await
        .unwrap();
    let comments = comment_repo::list_for_post(&pool, newer.id).await.unwrap();
    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    let first_pos = texts.iter().position(|t| *t == "first").unwrap();
    let second_pos = texts.iter().position(|t| *t == "second").unwrap();
    assert!(first_pos < second_pos);
}

async fn test_cache() -> IndexCache {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let client = redis::Client::open(url).expect("well-formed Redis URL");
    let manager = ConnectionManager::new(client)
        .await
        .expect("connect to test Redis");
    IndexCache::new(manager, 20)
}

#[actix_web::test]
#[ignore]
async fn editing_as_non_author_redirects_without_mutating() {
    let pool = connect().await;
    let author = create_user(&pool, "author").await;
    let intruder = create_user(&pool, "intruder").await;
    let post = post_repo::create_post(&pool, author.id, "original text", None, None)
        .await
        .unwrap();

    std::env::remove_var("APP_ENV");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_cache().await))
            .app_data(web::Data::new(Config::from_env().unwrap()))
            .wrap(IdentityMiddleware)
            .service(
                web::resource("/posts/{id}/edit/")
                    .route(web::post().to(handlers::post_edit_submit)),
            ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header((USER_ID_HEADER, intruder.id.to_string()))
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload("text=hijacked")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(LOCATION).unwrap().to_str().unwrap(),
        format!("/posts/{}/", post.id)
    );

    let untouched = post_repo::find_post_by_id(&pool, post.id)
        .await
        .unwrap()
        .expect("post still present");
    assert_eq!(untouched.text, "original text");
}

#[actix_web::test]
#[ignore]
async fn editing_as_the_author_updates_the_post() {
    let pool = connect().await;
    let author = create_user(&pool, "author").await;
    let post = post_repo::create_post(&pool, author.id, "original text", None, None)
        .await
        .unwrap();

    std::env::remove_var("APP_ENV");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_cache().await))
            .app_data(web::Data::new(Config::from_env().unwrap()))
            .wrap(IdentityMiddleware)
            .service(
                web::resource("/posts/{id}/edit/")
                    .route(web::post().to(handlers::post_edit_submit)),
            ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header((USER_ID_HEADER, author.id.to_string()))
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload("text=revised+text")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);

    let updated = post_repo::find_post_by_id(&pool, post.id)
        .await
        .unwrap()
        .expect("post still present");
    assert_eq!(updated.text, "revised text");
    assert_eq!(updated.pub_date, post.pub_date);
}

#[tokio::test]
#[ignore]
async fn profile_lookup_roundtrip() {
    let pool = connect().await;
    let user = create_user(&pool, "lookup").await;

    let by_name = user_repo::find_by_username(&pool, &user.username)
        .await
        .unwrap()
        .expect("user found by name");
    assert_eq!(by_name.id, user.id);

    let by_id = user_repo::find_by_id(&pool, user.id)
        .await
        .unwrap()
        .expect("user found by id");
    assert_eq!(by_id.username, user.username);
}
