//! Route definitions for the admin surface.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, auth, pages};
use crate::state::AppState;

/// Ceiling for one admin request body, covering a batch of gallery uploads.
const MAX_ADMIN_BODY_BYTES: usize = 64 * 1024 * 1024;

/// ```text
/// GET  /login       sign-in form
/// POST /login       sign in
/// POST /logout      sign out
/// GET  /admin       admin shell (session required)
/// POST /admin/api   action dispatch (session required)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/admin", get(pages::admin))
        .route(
            "/admin/api",
            post(admin::dispatch).layer(DefaultBodyLimit::max(MAX_ADMIN_BODY_BYTES)),
        )
}
