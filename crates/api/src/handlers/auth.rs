//! Admin sign-in and sign-out.

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use serde_json::json;

use crate::auth::jwt::{clear_session_cookie, generate_session_token, session_cookie};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> AppResult<Html<String>> {
    let error = query.error.map(|_| "Invalid username or password");
    state
        .templates
        .render(
            "login",
            &json!({ "page_title": "Sign in", "error": error }),
        )
        .map(Html)
        .map_err(|e| AppError::InternalError(format!("Failed to render login: {e}")))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /login
///
/// On success sets the session cookie and redirects to `/admin`; otherwise
/// redirects back to the form.
pub async fn login(State(state): State<AppState>, Form(input): Form<LoginForm>) -> AppResult<Response> {
    let admin = &state.config.admin;

    let password_ok = match verify_password(&input.password, &admin.password_hash) {
        Ok(ok) => ok,
        Err(e) => {
            tracing::error!(error = %e, "Configured admin password hash is invalid");
            false
        }
    };

    if input.username.trim() != admin.username || !password_ok {
        tracing::warn!(username = %input.username, "Failed admin login");
        return Ok(Redirect::to("/login?error=1").into_response());
    }

    let token = generate_session_token(&admin.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Failed to sign session: {e}")))?;

    tracing::info!(username = %admin.username, "Admin signed in");
    Ok((
        [(SET_COOKIE, session_cookie(&token, &state.config.jwt))],
        Redirect::to("/admin"),
    )
        .into_response())
}

/// POST /logout
pub async fn logout() -> Response {
    (
        [(SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}
