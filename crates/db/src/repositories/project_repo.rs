//! Repository for the `projects` table.
//!
//! Every read query is built from [`LIVE`], so soft-deleted rows never leak
//! into listings, detail pages, counts, the sitemap or import lookups.

use std::collections::HashMap;

use folio_core::classification::{ProjectCategory, ProjectStatus};
use folio_core::composite::{encode_gallery, encode_list};
use folio_core::import::ImportedProject;
use folio_core::settings::LiveCounts;
use folio_core::sitemap::SitemapProject;
use folio_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Postgres, Row};

use crate::models::project::{Project, ProjectRow, SaveOutcome, SaveProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, short_description, category, status, \
    client_name, project_duration, completion_date, year, image_url, project_url, \
    github_url, github_repo_id, tools, features, technical_features, creative_highlights, \
    challenges, gallery_images, timeline, design_concept, color_palette, typography, \
    creative_challenge, creative_approach, creative_solution, inspiration_source, \
    target_audience, lessons_learned, results_impact, performance_score, lines_of_code, \
    components_count, development_weeks, is_featured, created_at, updated_at";

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Soft-delete predicate applied to every read.
const LIVE: &str = "is_deleted = FALSE";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// List live projects, most recently updated first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE {LIVE} ORDER BY updated_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&query).fetch_all(pool).await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    /// Featured live projects for the home page.
    pub async fn list_featured(pool: &PgPool, limit: i64) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE {LIVE} AND is_featured = TRUE
             ORDER BY updated_at DESC, id DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    /// Find a live project by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND {LIVE}");
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Project::from))
    }

    /// Insert a project, returning the generated id.
    pub async fn create(pool: &PgPool, input: &SaveProject) -> Result<DbId, sqlx::Error> {
        let query = "INSERT INTO projects (
                title, description, short_description, category, status,
                client_name, project_duration, completion_date, year, image_url,
                project_url, github_url, tools, features, technical_features,
                creative_highlights, challenges, timeline, gallery_images,
                design_concept, color_palette, typography, creative_challenge,
                creative_approach, creative_solution, inspiration_source,
                target_audience, lessons_learned, results_impact,
                performance_score, lines_of_code, components_count,
                development_weeks, is_featured
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28,
                $29, $30, $31, $32, $33, $34
            ) RETURNING id";
        let row = bind_save(sqlx::query(query), input).fetch_one(pool).await?;
        row.try_get("id")
    }

    /// Overwrite every mutable column of a live project.
    ///
    /// Returns `false` if no live row with the given `id` exists.
    pub async fn update(pool: &PgPool, id: DbId, input: &SaveProject) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = $1, description = $2, short_description = $3,
                category = $4, status = $5, client_name = $6,
                project_duration = $7, completion_date = $8, year = $9,
                image_url = $10, project_url = $11, github_url = $12,
                tools = $13, features = $14, technical_features = $15,
                creative_highlights = $16, challenges = $17, timeline = $18,
                gallery_images = $19, design_concept = $20, color_palette = $21,
                typography = $22, creative_challenge = $23,
                creative_approach = $24, creative_solution = $25,
                inspiration_source = $26, target_audience = $27,
                lessons_learned = $28, results_impact = $29,
                performance_score = $30, lines_of_code = $31,
                components_count = $32, development_weeks = $33,
                is_featured = $34, updated_at = NOW()
             WHERE id = $35 AND {LIVE}"
        );
        let result = bind_save(sqlx::query(&query), input)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Create or update depending on `input.id`.
    ///
    /// Returns `None` when updating an id that has no live row.
    pub async fn save(pool: &PgPool, input: &SaveProject) -> Result<Option<SaveOutcome>, sqlx::Error> {
        match input.id {
            Some(id) => {
                let updated = Self::update(pool, id, input).await?;
                Ok(updated.then_some(SaveOutcome { id, created: false }))
            }
            None => {
                let id = Self::create(pool, input).await?;
                Ok(Some(SaveOutcome { id, created: true }))
            }
        }
    }

    /// Soft-delete a project. Returns `true` if a live row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND {LIVE}"
        );
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Other live projects in the same category, featured first then newest.
    pub async fn list_related(
        pool: &PgPool,
        id: DbId,
        category: ProjectCategory,
        limit: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE {LIVE} AND category = $1 AND id <> $2
             ORDER BY is_featured DESC, created_at DESC, id DESC
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(category.as_str())
            .bind(id)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    /// Live project counts in total and per category.
    ///
    /// Stored categories outside the known set count toward the default.
    pub async fn category_counts(pool: &PgPool) -> Result<LiveCounts, sqlx::Error> {
        let query = format!(
            "SELECT category, COUNT(*) FROM projects WHERE {LIVE} GROUP BY category"
        );
        let rows: Vec<(String, i64)> = sqlx::query_as(&query).fetch_all(pool).await?;

        let mut by_category: HashMap<ProjectCategory, i64> = HashMap::new();
        let mut total = 0;
        for (category, count) in rows {
            *by_category
                .entry(ProjectCategory::parse_or_default(&category))
                .or_insert(0) += count;
            total += count;
        }
        Ok(LiveCounts { total, by_category })
    }

    /// Ids and last-update dates of live projects, for the sitemap.
    pub async fn list_for_sitemap(pool: &PgPool) -> Result<Vec<SitemapProject>, sqlx::Error> {
        let query = format!(
            "SELECT id, updated_at::date FROM projects WHERE {LIVE} ORDER BY updated_at DESC, id DESC"
        );
        let rows: Vec<(DbId, Option<chrono::NaiveDate>)> =
            sqlx::query_as(&query).fetch_all(pool).await?;
        Ok(rows
            .into_iter()
            .map(|(id, updated_at)| SitemapProject { id, updated_at })
            .collect())
    }

    /// The live project linked to a GitHub repository, if any.
    pub async fn find_by_github_repo_id(
        pool: &PgPool,
        repo_id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE github_repo_id = $1 AND {LIVE}");
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(repo_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Project::from))
    }

    /// Insert a project derived from a GitHub repository.
    pub async fn create_imported(pool: &PgPool, input: &ImportedProject) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO projects (
                title, description, short_description, category, status, year,
                tools, github_url, project_url, github_repo_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.short_description)
        .bind(input.category.as_str())
        .bind(ProjectStatus::Completed.as_str())
        .bind(input.year)
        .bind(encode_list(&input.tools))
        .bind(&input.github_url)
        .bind(&input.project_url)
        .bind(input.github_repo_id)
        .fetch_one(pool)
        .await
    }

    /// Refresh the GitHub-derived columns of an already linked project.
    ///
    /// Hand-curated fields (category, gallery, case study) are left alone.
    pub async fn update_imported(
        pool: &PgPool,
        id: DbId,
        input: &ImportedProject,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = $2, description = $3, short_description = $4,
                tools = $5, github_url = $6, project_url = $7,
                updated_at = NOW()
             WHERE id = $1 AND {LIVE}"
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.short_description)
            .bind(encode_list(&input.tools))
            .bind(&input.github_url)
            .bind(&input.project_url)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Bind the 34 save columns in the order shared by `create` and `update`.
fn bind_save<'q>(query: PgQuery<'q>, input: &'q SaveProject) -> PgQuery<'q> {
    query
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.short_description)
        .bind(input.category.as_str())
        .bind(input.status.as_str())
        .bind(&input.client_name)
        .bind(&input.project_duration)
        .bind(input.completion_date)
        .bind(input.year)
        .bind(&input.image_url)
        .bind(&input.project_url)
        .bind(&input.github_url)
        .bind(encode_list(&input.tools))
        .bind(encode_list(&input.features))
        .bind(encode_list(&input.technical_features))
        .bind(encode_list(&input.creative_highlights))
        .bind(encode_list(&input.challenges))
        .bind(encode_list(&input.timeline))
        .bind(encode_gallery(&input.gallery_images))
        .bind(&input.design_concept)
        .bind(&input.color_palette)
        .bind(&input.typography)
        .bind(&input.creative_challenge)
        .bind(&input.creative_approach)
        .bind(&input.creative_solution)
        .bind(&input.inspiration_source)
        .bind(&input.target_audience)
        .bind(&input.lessons_learned)
        .bind(&input.results_impact)
        .bind(input.performance_score)
        .bind(input.lines_of_code)
        .bind(input.components_count)
        .bind(input.development_weeks)
        .bind(input.is_featured)
}
