/// Blog Service Library
///
/// Backend core for the blogging platform: users publish posts, file them
/// under groups, comment, and follow other authors; listing views are
/// paginated and the home feed payload is cached with write-triggered
/// invalidation.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers, one per user-facing action
/// - `models`: Entity structs and eager-loaded row shapes
/// - `db`: Repositories over PostgreSQL (sqlx)
/// - `forms`: Explicit per-entity form validators
/// - `pagination`: Fixed-size page windows with clamping
/// - `cache`: The Redis-backed index page entry
/// - `render`: Render and redirect instruction helpers
/// - `middleware`: Gateway identity header handling
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod render;

pub use config::Config;
pub use error::{AppError, Result};
