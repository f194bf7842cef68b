//! Public pages and the admin shell.

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use folio_core::classification::{PhaseStatus, PhaseType, ProjectCategory, ProjectStatus};
use folio_core::fields::parse_id;
use folio_core::settings::{resolve_counts, CountDisplay, CountMetric, YEARS_EXPERIENCE};
use folio_db::repositories::{ProjectRepo, SettingRepo, TimelinePhaseRepo};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AdminSession;
use crate::state::AppState;

const SITE_TITLE: &str = "Portfolio";
const FEATURED_LIMIT: i64 = 6;
const RELATED_LIMIT: i64 = 3;
const UNAVAILABLE: &str = "Projects are temporarily unavailable.";

fn render(state: &AppState, template: &str, data: &Value) -> AppResult<Html<String>> {
    state
        .templates
        .render(template, data)
        .map(Html)
        .map_err(|e| AppError::InternalError(format!("Failed to render {template}: {e}")))
}

/// Effective filter counts; live counts alone if overrides cannot be read.
async fn filter_counts(state: &AppState) -> Result<Vec<CountDisplay>, sqlx::Error> {
    let live = ProjectRepo::category_counts(&state.pool).await?;
    let overrides = SettingRepo::list_overrides(&state.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load count overrides");
            Vec::new()
        });
    Ok(resolve_counts(&overrides, &live))
}

/// GET /
pub async fn home(State(state): State<AppState>) -> AppResult<Html<String>> {
    let (featured, error) = match ProjectRepo::list_featured(&state.pool, FEATURED_LIMIT).await {
        Ok(projects) => (projects, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load featured projects");
            (Vec::new(), Some(UNAVAILABLE))
        }
    };
    let total = filter_counts(&state)
        .await
        .ok()
        .and_then(|counts| counts.into_iter().find(|c| c.metric == CountMetric::All))
        .map(|c| c.effective)
        .unwrap_or(0);
    let years = SettingRepo::get(&state.pool, YEARS_EXPERIENCE)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load years of experience");
            None
        });

    render(
        &state,
        "home",
        &json!({
            "page_title": SITE_TITLE,
            "featured": featured,
            "total_projects": total,
            "years_experience": years,
            "error": error,
        }),
    )
}

/// GET /portfolio
pub async fn portfolio(State(state): State<AppState>) -> AppResult<Html<String>> {
    let (projects, error) = match ProjectRepo::list(&state.pool).await {
        Ok(projects) => (projects, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list projects");
            (Vec::new(), Some(UNAVAILABLE))
        }
    };

    let counts = filter_counts(&state).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to compute filter counts");
        Vec::new()
    });
    let filters: Vec<Value> = counts
        .iter()
        .map(|c| {
            let (key, label) = match c.metric.category() {
                Some(category) => (category.as_str(), category.label()),
                None => ("all", "All"),
            };
            json!({ "key": key, "label": label, "count": c.effective })
        })
        .collect();

    render(
        &state,
        "portfolio",
        &json!({
            "page_title": format!("{SITE_TITLE} | Work"),
            "projects": projects,
            "filters": filters,
            "error": error,
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub id: Option<String>,
}

/// GET /project?id=N
///
/// Falls back to the configured default project when `id` is absent or not
/// a positive integer. Unknown or deleted projects redirect home.
pub async fn project(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> AppResult<Response> {
    let id = query
        .id
        .as_deref()
        .and_then(parse_id)
        .unwrap_or(state.config.default_project_id);

    let Some(project) = ProjectRepo::find_by_id(&state.pool, id).await? else {
        tracing::debug!(project_id = id, "Project not found, redirecting home");
        return Ok(Redirect::to("/").into_response());
    };

    let phases = TimelinePhaseRepo::list_for_project(&state.pool, id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(project_id = id, error = %e, "Failed to load timeline phases");
            Vec::new()
        });
    let related = ProjectRepo::list_related(&state.pool, id, project.category, RELATED_LIMIT)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(project_id = id, error = %e, "Failed to load related projects");
            Vec::new()
        });

    let html = render(
        &state,
        "project",
        &json!({
            "page_title": format!("{} | {SITE_TITLE}", project.title),
            "category_label": project.category.label(),
            "project": project,
            "phases": phases,
            "related": related,
        }),
    )?;
    Ok(html.into_response())
}

/// GET /admin
pub async fn admin(
    State(state): State<AppState>,
    session: Option<AdminSession>,
) -> AppResult<Response> {
    let Some(session) = session else {
        return Ok(Redirect::to("/login").into_response());
    };

    let categories: Vec<Value> = ProjectCategory::ALL
        .iter()
        .map(|c| json!({ "value": c.as_str(), "label": c.label() }))
        .collect();
    let statuses: Vec<&str> = ProjectStatus::ALL.iter().map(|s| s.as_str()).collect();
    let phase_types: Vec<&str> = PhaseType::ALL.iter().map(|t| t.as_str()).collect();
    let phase_statuses: Vec<&str> = PhaseStatus::ALL.iter().map(|s| s.as_str()).collect();

    let html = render(
        &state,
        "admin",
        &json!({
            "page_title": format!("{SITE_TITLE} | Admin"),
            "username": session.username,
            "categories": categories,
            "statuses": statuses,
            "phase_types": phase_types,
            "phase_statuses": phase_statuses,
        }),
    )?;
    Ok(html.into_response())
}
