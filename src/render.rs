/// Render and redirect instructions
///
/// Template rendering lives outside this core: handlers emit a render
/// instruction (template id + context mapping) which the external renderer
/// turns into HTML. The instruction is serialized as the JSON response body,
/// which also gives the cache layer a stable byte payload to store.
use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;
use serde_json::Value;

/// Serialize a render instruction to the bytes the cache layer stores.
pub fn render_payload(template: &str, context: &Value) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "template": template,
        "context": context,
    }))
    .unwrap_or_default()
}

/// Respond with a render instruction for `template` over `context`.
pub fn render_page(template: &str, context: &Value) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(render_payload(template, context))
}

/// Respond with previously rendered payload bytes (cache hits).
pub fn render_cached(payload: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(payload)
}

/// HTTP 302 to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

/// Redirect an unauthenticated request to the login route, preserving the
/// originally requested path.
pub fn login_redirect(login_url: &str, next: &str) -> HttpResponse {
    redirect(&format!("{}?next={}", login_url, next))
}

/// The custom not-found page instruction.
pub fn not_found_page() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("application/json")
        .body(render_payload(
            "core/404.html",
            &serde_json::json!({ "title": "Page not found" }),
        ))
}
