use std::sync::Arc;

use handlebars::Handlebars;

use crate::config::ServerConfig;
use crate::github::GithubClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: folio_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// GitHub REST client used by the import actions.
    pub github: Arc<GithubClient>,
    /// Compiled page templates.
    pub templates: Arc<Handlebars<'static>>,
}
