//! Repository for the `timeline_phases` table.

use folio_core::composite::encode_list;
use folio_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::timeline_phase::{SavePhase, TimelinePhase, TimelinePhaseRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, phase_name, phase_type, phase_description, \
    phase_details, week_number, phase_status, start_date, end_date, tasks, deliverables, \
    created_at, updated_at";

/// Display order used by the admin editor and the detail page alike.
const ORDER: &str = "week_number ASC NULLS FIRST, phase_name ASC, id ASC";

/// Provides CRUD operations for timeline phases.
pub struct TimelinePhaseRepo;

impl TimelinePhaseRepo {
    /// All phases of a project in display order.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<TimelinePhase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_phases WHERE project_id = $1 ORDER BY {ORDER}"
        );
        let rows = sqlx::query_as::<_, TimelinePhaseRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(TimelinePhase::from).collect())
    }

    /// Insert a phase, returning the generated id.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &SavePhase,
    ) -> Result<DbId, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        insert(&mut conn, project_id, input).await
    }

    /// Overwrite a phase. Returns `false` if no row with the given `id` exists.
    pub async fn update(pool: &PgPool, id: DbId, input: &SavePhase) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE timeline_phases SET
                phase_name = $2, phase_type = $3, phase_description = $4,
                phase_details = $5, week_number = $6, phase_status = $7,
                start_date = $8, end_date = $9, tasks = $10, deliverables = $11,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.phase_name)
        .bind(input.phase_type.map(|t| t.as_str()))
        .bind(&input.phase_description)
        .bind(&input.phase_details)
        .bind(input.week_number)
        .bind(input.phase_status.as_str())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(encode_list(&input.tasks))
        .bind(encode_list(&input.deliverables))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a phase. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timeline_phases WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace a project's phases with `phases`, inserted in the given order.
    ///
    /// Runs in one transaction; on any failure the previous set is kept.
    pub async fn replace_all_for_project(
        pool: &PgPool,
        project_id: DbId,
        phases: &[SavePhase],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM timeline_phases WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        let mut ids = Vec::with_capacity(phases.len());
        for phase in phases {
            ids.push(insert(&mut tx, project_id, phase).await?);
        }

        tx.commit().await?;
        Ok(ids)
    }
}

async fn insert(
    conn: &mut PgConnection,
    project_id: DbId,
    input: &SavePhase,
) -> Result<DbId, sqlx::Error> {
    sqlx::query_scalar::<_, DbId>(
        "INSERT INTO timeline_phases (
            project_id, phase_name, phase_type, phase_description, phase_details,
            week_number, phase_status, start_date, end_date, tasks, deliverables
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id",
    )
    .bind(project_id)
    .bind(&input.phase_name)
    .bind(input.phase_type.map(|t| t.as_str()))
    .bind(&input.phase_description)
    .bind(&input.phase_details)
    .bind(input.week_number)
    .bind(input.phase_status.as_str())
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(encode_list(&input.tasks))
    .bind(encode_list(&input.deliverables))
    .fetch_one(conn)
    .await
}
