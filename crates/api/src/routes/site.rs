//! Public pages and files served from disk.

use axum::routing::get;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::ServerConfig;
use crate::handlers::pages;
use crate::state::AppState;

/// ```text
/// GET /               home
/// GET /portfolio      all projects with filter counts
/// GET /project?id=N   project detail
/// GET /static/*       static assets
/// GET /uploads/*      uploaded gallery images
/// GET /sitemap.xml    last generated sitemap
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/portfolio", get(pages::portfolio))
        .route("/project", get(pages::project))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .nest_service("/uploads", ServeDir::new(&config.upload_root))
        .route_service("/sitemap.xml", ServeFile::new(&config.sitemap_path))
}
