//! Handler for the admin action endpoint.
//!
//! Every admin operation is a `POST /admin/api` whose `action` field selects
//! the behaviour. Successful actions answer with [`ActionResponse`]; failures
//! surface as [`AppError`].

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use chrono::Datelike;
use folio_core::composite::GalleryImage;
use folio_core::error::CoreError;
use folio_core::fields::{non_blank, parse_id};
use folio_core::import::{derive_project, GithubRepository};
use folio_core::settings::{
    clear_target, plan_writes, resolve_counts, ClearTarget, SettingWrite, GITHUB_TOKEN,
    GITHUB_USERNAME, SCALAR_KEYS,
};
use folio_core::types::DbId;
use folio_core::upload::{discard_uploads, store_uploads, GalleryTarget};
use folio_db::models::project::ProjectForm;
use folio_db::models::timeline_phase::{PhaseEntry, PhaseForm};
use folio_db::repositories::{ProjectRepo, SettingRepo, TimelinePhaseRepo};
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::form::AdminForm;
use crate::middleware::auth::AdminSession;
use crate::response::ActionResponse;
use crate::sitemap;
use crate::state::AppState;

/// POST /admin/api
pub async fn dispatch(
    State(state): State<AppState>,
    session: AdminSession,
    form: AdminForm,
) -> AppResult<Response> {
    let Some(action) = form.action().map(str::to_string) else {
        return Err(AppError::BadRequest("Missing action".into()));
    };
    tracing::debug!(%action, user = %session.username, "Admin action");

    match action.as_str() {
        "get_projects" => get_projects(&state).await,
        "get_project" => get_project(&state, &form).await,
        "save_project" => save_project(&state, form).await,
        "delete_project" => delete_project(&state, &form).await,
        "get_timeline_phases" => get_timeline_phases(&state, &form).await,
        "save_timeline_phase" => save_timeline_phase(&state, &form).await,
        "delete_timeline_phase" => delete_timeline_phase(&state, &form).await,
        "get_statistics" => get_statistics(&state).await,
        "save_statistics" => save_statistics(&state, &form).await,
        "clear_manual_setting" => clear_manual_setting(&state, &form).await,
        "regenerate_sitemap" => regenerate_sitemap(&state).await,
        "get_github_repos" => get_github_repos(&state, &form).await,
        "import_github_project" => import_github_project(&state, &form).await,
        other => Err(AppError::BadRequest(format!("Unknown action: {other}"))),
    }
}

/// A required positive id field.
fn required_id(form: &AdminForm, name: &str) -> AppResult<DbId> {
    form.get(name)
        .and_then(parse_id)
        .ok_or_else(|| AppError::BadRequest(format!("Missing or invalid '{name}'")))
}

#[derive(Debug, Serialize)]
struct IdPayload {
    id: DbId,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

async fn get_projects(state: &AppState) -> AppResult<Response> {
    let projects = ProjectRepo::list(&state.pool).await?;
    Ok(ActionResponse::data(projects).into_response())
}

async fn get_project(state: &AppState, form: &AdminForm) -> AppResult<Response> {
    let id = required_id(form, "id")?;
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(ActionResponse::data(project).into_response())
}

async fn save_project(state: &AppState, form: AdminForm) -> AppResult<Response> {
    let mut input: ProjectForm = form.parse()?;
    let title = input.title.as_deref().and_then(non_blank).ok_or_else(|| {
        AppError::Core(CoreError::Validation("Project title is required".into()))
    })?;

    let retained: Vec<GalleryImage> = match input.project_id() {
        Some(id) => {
            let existing = ProjectRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Project",
                    id,
                }))?;
            if input.keeps_existing_gallery() {
                existing.gallery_images
            } else {
                Vec::new()
            }
        }
        None => Vec::new(),
    };

    let target = GalleryTarget::new(
        state.config.gallery_dir(),
        state.config.gallery_url_prefix(),
        &title,
    );
    let uploaded = store_uploads(&target, form.files).await?;

    let phases = input.timeline_phases.take();
    let current_year = chrono::Utc::now().year();
    let save = match input.into_save(retained, uploaded.clone(), current_year) {
        Ok(save) => save,
        Err(e) => {
            discard_uploads(&target, &uploaded).await;
            return Err(e.into());
        }
    };

    let outcome = match ProjectRepo::save(&state.pool, &save).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => {
            discard_uploads(&target, &uploaded).await;
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: save.id.unwrap_or_default(),
            }));
        }
        Err(e) => {
            discard_uploads(&target, &uploaded).await;
            return Err(e.into());
        }
    };

    if let Some(entries) = phases {
        replace_phases(state, outcome.id, entries).await;
    }

    tracing::info!(project_id = outcome.id, created = outcome.created, "Project saved");
    let message = if outcome.created {
        "Project created successfully"
    } else {
        "Project updated successfully"
    };
    Ok(ActionResponse::with_message(message, IdPayload { id: outcome.id }).into_response())
}

/// Replace a saved project's phases. Failure does not affect the save.
async fn replace_phases(state: &AppState, project_id: DbId, entries: Vec<PhaseEntry>) {
    let phases: Vec<_> = entries.into_iter().filter_map(PhaseEntry::into_save).collect();
    match TimelinePhaseRepo::replace_all_for_project(&state.pool, project_id, &phases).await {
        Ok(ids) => tracing::debug!(project_id, count = ids.len(), "Timeline phases replaced"),
        Err(e) => tracing::warn!(project_id, error = %e, "Failed to replace timeline phases"),
    }
}

async fn delete_project(state: &AppState, form: &AdminForm) -> AppResult<Response> {
    let id = required_id(form, "id")?;
    if !ProjectRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }
    tracing::info!(project_id = id, "Project deleted");
    sitemap::refresh_after_change(state).await;
    Ok(ActionResponse::message("Project deleted successfully").into_response())
}

// ---------------------------------------------------------------------------
// Timeline phases
// ---------------------------------------------------------------------------

async fn get_timeline_phases(state: &AppState, form: &AdminForm) -> AppResult<Response> {
    let project_id = required_id(form, "project_id")?;
    let phases = TimelinePhaseRepo::list_for_project(&state.pool, project_id).await?;
    Ok(ActionResponse::data(phases).into_response())
}

async fn save_timeline_phase(state: &AppState, form: &AdminForm) -> AppResult<Response> {
    let input: PhaseForm = form.parse()?;
    let phase_id = input.phase_id();
    let project_id = input.project_id();
    let save = input.into_save()?;

    let id = match phase_id {
        Some(id) => {
            if !TimelinePhaseRepo::update(&state.pool, id, &save).await? {
                return Err(AppError::Core(CoreError::NotFound {
                    entity: "TimelinePhase",
                    id,
                }));
            }
            id
        }
        None => {
            let project_id = project_id.ok_or_else(|| {
                AppError::BadRequest("Missing or invalid 'project_id'".into())
            })?;
            if ProjectRepo::find_by_id(&state.pool, project_id).await?.is_none() {
                return Err(AppError::Core(CoreError::NotFound {
                    entity: "Project",
                    id: project_id,
                }));
            }
            TimelinePhaseRepo::create(&state.pool, project_id, &save).await?
        }
    };

    Ok(ActionResponse::with_message("Timeline phase saved successfully", IdPayload { id })
        .into_response())
}

async fn delete_timeline_phase(state: &AppState, form: &AdminForm) -> AppResult<Response> {
    let id = required_id(form, "phase_id")?;
    if !TimelinePhaseRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "TimelinePhase",
            id,
        }));
    }
    Ok(ActionResponse::message("Timeline phase deleted successfully").into_response())
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

async fn get_statistics(state: &AppState) -> AppResult<Response> {
    let settings = SettingRepo::get_subset(&state.pool, SCALAR_KEYS).await?;
    let overrides = SettingRepo::list_overrides(&state.pool).await?;
    let live = ProjectRepo::category_counts(&state.pool).await?;
    let counts = resolve_counts(&overrides, &live);
    Ok(ActionResponse::data(json!({
        "settings": settings,
        "counts": counts,
    }))
    .into_response())
}

async fn save_statistics(state: &AppState, form: &AdminForm) -> AppResult<Response> {
    let writes = plan_writes(form.pairs());
    for write in &writes {
        match write {
            SettingWrite::Scalar { key, value } => {
                SettingRepo::upsert_scalar(&state.pool, key, value).await?
            }
            SettingWrite::ManualCount { metric, value } => {
                SettingRepo::set_manual(&state.pool, *metric, *value).await?
            }
            SettingWrite::AutoFlag { metric, auto } => {
                SettingRepo::set_auto(&state.pool, *metric, *auto).await?
            }
        }
    }
    tracing::info!(count = writes.len(), "Settings saved");
    Ok(ActionResponse::with_message(
        "Settings saved successfully",
        json!({ "updated": writes.len() }),
    )
    .into_response())
}

async fn clear_manual_setting(state: &AppState, form: &AdminForm) -> AppResult<Response> {
    let key = form
        .get("setting_key")
        .or_else(|| form.get("key"))
        .unwrap_or("");
    let target = clear_target(key)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown setting: {key}")))?;

    match target {
        ClearTarget::Scalar(key) => {
            SettingRepo::delete_scalar(&state.pool, key).await?;
        }
        ClearTarget::Count(metric) => SettingRepo::reset_override(&state.pool, metric).await?,
    }
    Ok(ActionResponse::message("Setting cleared").into_response())
}

// ---------------------------------------------------------------------------
// Sitemap
// ---------------------------------------------------------------------------

async fn regenerate_sitemap(state: &AppState) -> AppResult<Response> {
    let report = sitemap::regenerate(state).await?;
    Ok(ActionResponse::with_message("Sitemap regenerated successfully", report).into_response())
}

// ---------------------------------------------------------------------------
// GitHub import
// ---------------------------------------------------------------------------

/// GitHub username (form override, else stored setting) and stored token.
async fn github_credentials(
    state: &AppState,
    form: &AdminForm,
) -> AppResult<(String, Option<String>)> {
    let stored = SettingRepo::get_subset(&state.pool, &[GITHUB_USERNAME, GITHUB_TOKEN]).await?;
    let username = form
        .get("username")
        .and_then(non_blank)
        .or_else(|| stored.get(GITHUB_USERNAME).and_then(|u| non_blank(u)))
        .ok_or_else(|| AppError::BadRequest("GitHub username is not configured".into()))?;
    let token = stored.get(GITHUB_TOKEN).and_then(|t| non_blank(t));
    Ok((username, token))
}

#[derive(Debug, Serialize)]
struct RepositoryListing {
    #[serde(flatten)]
    repository: GithubRepository,
    /// The live project already linked to this repository.
    project_id: Option<DbId>,
}

async fn get_github_repos(state: &AppState, form: &AdminForm) -> AppResult<Response> {
    let (username, token) = github_credentials(state, form).await?;
    let repositories = state
        .github
        .list_repositories(&username, token.as_deref())
        .await?;

    let mut listings = Vec::with_capacity(repositories.len());
    for repository in repositories {
        let project_id = ProjectRepo::find_by_github_repo_id(&state.pool, repository.id)
            .await?
            .map(|p| p.id);
        listings.push(RepositoryListing {
            repository,
            project_id,
        });
    }
    Ok(ActionResponse::data(listings).into_response())
}

#[derive(Debug, Serialize)]
struct ImportPayload {
    id: DbId,
    created: bool,
}

async fn import_github_project(state: &AppState, form: &AdminForm) -> AppResult<Response> {
    let repository: GithubRepository = match form.to_value().get("repository") {
        Some(value) if value.is_object() => serde_json::from_value(value.clone())
            .map_err(|e| AppError::BadRequest(format!("Invalid repository: {e}")))?,
        _ => {
            let name = form
                .get("repo_name")
                .and_then(non_blank)
                .ok_or_else(|| AppError::BadRequest("Missing 'repository' or 'repo_name'".into()))?;
            let (username, token) = github_credentials(state, form).await?;
            state
                .github
                .get_repository(&username, &name, token.as_deref())
                .await?
        }
    };

    let imported = derive_project(&repository, chrono::Utc::now().year());

    if let Some(existing) =
        ProjectRepo::find_by_github_repo_id(&state.pool, imported.github_repo_id).await?
    {
        ProjectRepo::update_imported(&state.pool, existing.id, &imported).await?;
        tracing::info!(project_id = existing.id, repo = %repository.name, "GitHub project updated");
        return Ok(ActionResponse::with_message(
            "Project updated from GitHub",
            ImportPayload {
                id: existing.id,
                created: false,
            },
        )
        .into_response());
    }

    let id = ProjectRepo::create_imported(&state.pool, &imported).await?;
    tracing::info!(project_id = id, repo = %repository.name, "GitHub project imported");
    sitemap::refresh_after_change(state).await;
    Ok(ActionResponse::with_message(
        "Project imported from GitHub",
        ImportPayload { id, created: true },
    )
    .into_response())
}
