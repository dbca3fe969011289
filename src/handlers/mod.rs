/// HTTP request handlers
///
/// One handler per user-facing action. Handlers orchestrate repositories,
/// form validation and authorization, and reply with either a render
/// instruction or a redirect. They hold no state of their own; the shared
/// pieces are the database pool and the index cache entry.
pub mod comments;
pub mod follows;
pub mod posts;

pub use comments::add_comment;
pub use follows::{follow_index, profile_follow, profile_unfollow};
pub use posts::{
    group_posts, index, post_create_form, post_create_submit, post_detail, post_edit_form,
    post_edit_submit, profile,
};

use actix_web::web;
use serde::Deserialize;

/// The `page` query parameter accepted by every listing view.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Decode an urlencoded form body.
///
/// Write handlers take the raw bytes instead of `web::Form` so the
/// authorization check runs before any body parsing: an anonymous POST must
/// get the login redirect even when its payload is missing or malformed. A
/// body that does not decode behaves like an empty submission and falls
/// through to field validation.
pub(crate) fn parse_form<T>(body: &web::Bytes) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    serde_urlencoded::from_bytes(body).unwrap_or_default()
}
