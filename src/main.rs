use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use blog_service::cache::IndexCache;
use blog_service::handlers;
use blog_service::middleware::IdentityMiddleware;
use blog_service::render;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health_summary(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

async fn not_found() -> HttpResponse {
    render::not_found_page()
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match blog_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migration failed: {e}")))?;

    tracing::info!("Connected to database, migrations applied");

    let redis_client = redis::Client::open(config.cache.url.clone()).map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Invalid Redis URL: {e}"),
        )
    })?;
    let redis_manager = ConnectionManager::new(redis_client).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to initialize Redis connection: {e}"),
        )
    })?;

    let index_cache = IndexCache::new(redis_manager, config.cache.index_ttl_secs);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let app_config = config.clone();

    HttpServer::new(move || {
        let cors_builder = Cors::default();
        let mut cors = cors_builder;
        for origin in app_config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(index_cache.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(IdentityMiddleware)
            .route("/health", web::get().to(health_summary))
            .route("/", web::get().to(handlers::index))
            .route("/group/{slug}/", web::get().to(handlers::group_posts))
            .route("/follow/", web::get().to(handlers::follow_index))
            .route(
                "/profile/{username}/follow/",
                web::get().to(handlers::profile_follow),
            )
            .route(
                "/profile/{username}/unfollow/",
                web::get().to(handlers::profile_unfollow),
            )
            .route("/profile/{username}/", web::get().to(handlers::profile))
            .service(
                web::resource("/create/")
                    .route(web::get().to(handlers::post_create_form))
                    .route(web::post().to(handlers::post_create_submit)),
            )
            .service(
                web::resource("/posts/{id}/edit/")
                    .route(web::get().to(handlers::post_edit_form))
                    .route(web::post().to(handlers::post_edit_submit)),
            )
            .route("/posts/{id}/comment/", web::post().to(handlers::add_comment))
            .route("/posts/{id}/", web::get().to(handlers::post_detail))
            .default_service(web::route().to(not_found))
    })
    .bind(&bind_address)?
    .run()
    .await
}
