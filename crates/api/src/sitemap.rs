//! Writing `sitemap.xml` to disk.

use std::path::Path;

use folio_core::sitemap::{build_entries, render};
use folio_db::repositories::ProjectRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Outcome of a regeneration, reported by the `regenerate_sitemap` action.
#[derive(Debug, Clone, Serialize)]
pub struct SitemapReport {
    pub path: String,
    pub url_count: usize,
}

/// Rebuild the sitemap from live projects and replace the file atomically.
pub async fn regenerate(state: &AppState) -> AppResult<SitemapReport> {
    let projects = ProjectRepo::list_for_sitemap(&state.pool).await?;
    let today = chrono::Utc::now().date_naive();
    let entries = build_entries(&state.config.site_base_url, &projects, today);
    let xml = render(&entries);

    write_atomically(&state.config.sitemap_path, xml.as_bytes())
        .await
        .map_err(|e| {
            AppError::InternalError(format!(
                "Failed to write sitemap to {}: {e}",
                state.config.sitemap_path.display()
            ))
        })?;

    tracing::info!(
        path = %state.config.sitemap_path.display(),
        url_count = entries.len(),
        "Sitemap regenerated"
    );
    Ok(SitemapReport {
        path: state.config.sitemap_path.display().to_string(),
        url_count: entries.len(),
    })
}

/// Regenerate after a content change. Failures are logged and swallowed.
pub async fn refresh_after_change(state: &AppState) {
    if let Err(e) = regenerate(state).await {
        tracing::warn!(error = %e, "Sitemap regeneration failed");
    }
}

async fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}
