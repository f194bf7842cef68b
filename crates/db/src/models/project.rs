//! Project entity model and DTOs.
//!
//! [`ProjectRow`] is the raw `projects` row with composite columns still
//! JSON-encoded; [`Project`] is the decoded shape every read path returns.
//! [`ProjectForm`] is what the admin form submits and [`SaveProject`] is the
//! normalized input the repository writes.

use folio_core::classification::{ProjectCategory, ProjectStatus};
use folio_core::composite::{
    decode_gallery, decode_list, GalleryImage, ListInput, Separator,
};
use folio_core::error::CoreError;
use folio_core::fields::{parse_flag, parse_id, parse_optional_date, parse_optional_int, parse_score};
use folio_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::timeline_phase::PhaseEntry;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `projects` table, composite columns undecoded.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub category: String,
    pub status: String,
    pub client_name: String,
    pub project_duration: String,
    pub completion_date: Option<Date>,
    pub year: i32,
    pub image_url: String,
    pub project_url: String,
    pub github_url: String,
    pub github_repo_id: Option<DbId>,
    pub tools: Option<String>,
    pub features: Option<String>,
    pub technical_features: Option<String>,
    pub creative_highlights: Option<String>,
    pub challenges: Option<String>,
    pub gallery_images: Option<String>,
    pub timeline: Option<String>,
    pub design_concept: String,
    pub color_palette: String,
    pub typography: String,
    pub creative_challenge: String,
    pub creative_approach: String,
    pub creative_solution: String,
    pub inspiration_source: String,
    pub target_audience: String,
    pub lessons_learned: String,
    pub results_impact: String,
    pub performance_score: Option<i32>,
    pub lines_of_code: Option<i32>,
    pub components_count: Option<i32>,
    pub development_weeks: Option<i32>,
    pub is_featured: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A live project with every composite column decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub category: ProjectCategory,
    pub status: ProjectStatus,
    pub client_name: String,
    pub project_duration: String,
    pub completion_date: Option<Date>,
    pub year: i32,
    pub image_url: String,
    pub project_url: String,
    pub github_url: String,
    pub github_repo_id: Option<DbId>,
    pub tools: Vec<String>,
    pub features: Vec<String>,
    pub technical_features: Vec<String>,
    pub creative_highlights: Vec<String>,
    pub challenges: Vec<String>,
    pub gallery_images: Vec<GalleryImage>,
    pub timeline: Vec<String>,
    pub design_concept: String,
    pub color_palette: String,
    pub typography: String,
    pub creative_challenge: String,
    pub creative_approach: String,
    pub creative_solution: String,
    pub inspiration_source: String,
    pub target_audience: String,
    pub lessons_learned: String,
    pub results_impact: String,
    pub performance_score: Option<i32>,
    pub lines_of_code: Option<i32>,
    pub components_count: Option<i32>,
    pub development_weeks: Option<i32>,
    pub is_featured: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            category: ProjectCategory::parse_or_default(&row.category),
            status: ProjectStatus::parse_or_default(&row.status),
            tools: decode_list(row.tools.as_deref()),
            features: decode_list(row.features.as_deref()),
            technical_features: decode_list(row.technical_features.as_deref()),
            creative_highlights: decode_list(row.creative_highlights.as_deref()),
            challenges: decode_list(row.challenges.as_deref()),
            gallery_images: decode_gallery(row.gallery_images.as_deref()),
            timeline: decode_list(row.timeline.as_deref()),
            title: row.title,
            description: row.description,
            short_description: row.short_description,
            client_name: row.client_name,
            project_duration: row.project_duration,
            completion_date: row.completion_date,
            year: row.year,
            image_url: row.image_url,
            project_url: row.project_url,
            github_url: row.github_url,
            github_repo_id: row.github_repo_id,
            design_concept: row.design_concept,
            color_palette: row.color_palette,
            typography: row.typography,
            creative_challenge: row.creative_challenge,
            creative_approach: row.creative_approach,
            creative_solution: row.creative_solution,
            inspiration_source: row.inspiration_source,
            target_audience: row.target_audience,
            lessons_learned: row.lessons_learned,
            results_impact: row.results_impact,
            performance_score: row.performance_score,
            lines_of_code: row.lines_of_code,
            components_count: row.components_count,
            development_weeks: row.development_weeks,
            is_featured: row.is_featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Form input
// ---------------------------------------------------------------------------

/// Admin form submission for `save_project`.
///
/// Every field is optional. Scalars arrive as text and are coerced by
/// [`ProjectForm::into_save`]; list fields accept either a structured
/// sequence or a single text value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectForm {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub client_name: Option<String>,
    pub project_duration: Option<String>,
    pub completion_date: Option<String>,
    pub year: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub tools: ListInput,
    pub features: ListInput,
    pub technical_features: ListInput,
    pub creative_highlights: ListInput,
    pub challenges: ListInput,
    pub timeline: ListInput,
    /// Newline-separated image URLs typed into the gallery box.
    pub gallery_urls: Option<String>,
    /// Keep the images already stored on the project when editing.
    pub keep_existing_gallery: Option<String>,
    pub design_concept: Option<String>,
    pub color_palette: Option<String>,
    pub typography: Option<String>,
    pub creative_challenge: Option<String>,
    pub creative_approach: Option<String>,
    pub creative_solution: Option<String>,
    pub inspiration_source: Option<String>,
    pub target_audience: Option<String>,
    pub lessons_learned: Option<String>,
    pub results_impact: Option<String>,
    pub performance_score: Option<String>,
    pub lines_of_code: Option<String>,
    pub components_count: Option<String>,
    pub development_weeks: Option<String>,
    pub is_featured: Option<String>,
    /// Phases edited alongside the project; replaces the stored set.
    pub timeline_phases: Option<Vec<PhaseEntry>>,
}

impl ProjectForm {
    /// The id of the project being edited, if any.
    pub fn project_id(&self) -> Option<DbId> {
        self.id.as_deref().and_then(parse_id)
    }

    /// Whether previously stored gallery images should be retained.
    pub fn keeps_existing_gallery(&self) -> bool {
        self.keep_existing_gallery.as_deref().is_some_and(parse_flag)
    }

    /// Normalize into a [`SaveProject`].
    ///
    /// `retained` is the project's current gallery (when kept) and
    /// `uploaded` the entries produced by the upload handler. The gallery is
    /// composed as retained, then uploaded, then manual URLs.
    pub fn into_save(
        self,
        retained: Vec<GalleryImage>,
        uploaded: Vec<GalleryImage>,
        current_year: i32,
    ) -> Result<SaveProject, CoreError> {
        let title = text(self.title);
        if title.is_empty() {
            return Err(CoreError::Validation("Project title is required".into()));
        }

        let manual = folio_core::gallery::parse_manual_urls(self.gallery_urls.as_deref().unwrap_or(""));
        let mut gallery_images = retained;
        gallery_images.extend(folio_core::gallery::merge_gallery(uploaded, manual));

        let id = self.id.as_deref().and_then(parse_id);
        let num = |v: Option<String>| v.as_deref().and_then(parse_optional_int);

        Ok(SaveProject {
            id,
            title,
            description: text(self.description),
            short_description: text(self.short_description),
            category: ProjectCategory::parse_or_default(self.category.as_deref().unwrap_or("")),
            status: ProjectStatus::parse_or_default(self.status.as_deref().unwrap_or("")),
            client_name: text(self.client_name),
            project_duration: text(self.project_duration),
            completion_date: self.completion_date.as_deref().and_then(parse_optional_date),
            year: num(self.year).unwrap_or(current_year),
            image_url: text(self.image_url),
            project_url: text(self.project_url),
            github_url: text(self.github_url),
            tools: self.tools.into_items(Separator::Comma),
            features: self.features.into_items(Separator::Newline),
            technical_features: self.technical_features.into_items(Separator::Newline),
            creative_highlights: self.creative_highlights.into_items(Separator::Newline),
            challenges: self.challenges.into_items(Separator::Newline),
            timeline: self.timeline.into_items(Separator::Newline),
            gallery_images,
            design_concept: text(self.design_concept),
            color_palette: text(self.color_palette),
            typography: text(self.typography),
            creative_challenge: text(self.creative_challenge),
            creative_approach: text(self.creative_approach),
            creative_solution: text(self.creative_solution),
            inspiration_source: text(self.inspiration_source),
            target_audience: text(self.target_audience),
            lessons_learned: text(self.lessons_learned),
            results_impact: text(self.results_impact),
            performance_score: self.performance_score.as_deref().and_then(parse_score),
            lines_of_code: num(self.lines_of_code),
            components_count: num(self.components_count),
            development_weeks: num(self.development_weeks),
            is_featured: self.is_featured.as_deref().is_some_and(parse_flag),
        })
    }
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Save DTO
// ---------------------------------------------------------------------------

/// Normalized project input. `id = None` inserts, `Some` updates.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveProject {
    pub id: Option<DbId>,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub category: ProjectCategory,
    pub status: ProjectStatus,
    pub client_name: String,
    pub project_duration: String,
    pub completion_date: Option<Date>,
    pub year: i32,
    pub image_url: String,
    pub project_url: String,
    pub github_url: String,
    pub tools: Vec<String>,
    pub features: Vec<String>,
    pub technical_features: Vec<String>,
    pub creative_highlights: Vec<String>,
    pub challenges: Vec<String>,
    pub timeline: Vec<String>,
    pub gallery_images: Vec<GalleryImage>,
    pub design_concept: String,
    pub color_palette: String,
    pub typography: String,
    pub creative_challenge: String,
    pub creative_approach: String,
    pub creative_solution: String,
    pub inspiration_source: String,
    pub target_audience: String,
    pub lessons_learned: String,
    pub results_impact: String,
    pub performance_score: Option<i32>,
    pub lines_of_code: Option<i32>,
    pub components_count: Option<i32>,
    pub development_weeks: Option<i32>,
    pub is_featured: bool,
}

impl SaveProject {
    /// A minimal project with every optional field at its default.
    pub fn titled(title: &str, current_year: i32) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            description: String::new(),
            short_description: String::new(),
            category: ProjectCategory::DEFAULT,
            status: ProjectStatus::DEFAULT,
            client_name: String::new(),
            project_duration: String::new(),
            completion_date: None,
            year: current_year,
            image_url: String::new(),
            project_url: String::new(),
            github_url: String::new(),
            tools: Vec::new(),
            features: Vec::new(),
            technical_features: Vec::new(),
            creative_highlights: Vec::new(),
            challenges: Vec::new(),
            timeline: Vec::new(),
            gallery_images: Vec::new(),
            design_concept: String::new(),
            color_palette: String::new(),
            typography: String::new(),
            creative_challenge: String::new(),
            creative_approach: String::new(),
            creative_solution: String::new(),
            inspiration_source: String::new(),
            target_audience: String::new(),
            lessons_learned: String::new(),
            results_impact: String::new(),
            performance_score: None,
            lines_of_code: None,
            components_count: None,
            development_weeks: None,
            is_featured: false,
        }
    }
}

/// Result of [`crate::repositories::ProjectRepo::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub id: DbId,
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: serde_json::Value) -> ProjectForm {
        serde_json::from_value(pairs).unwrap()
    }

    #[test]
    fn empty_form_needs_only_a_title() {
        let save = form(serde_json::json!({"title": "Site"}))
            .into_save(Vec::new(), Vec::new(), 2026)
            .unwrap();
        assert_eq!(save.id, None);
        assert_eq!(save.year, 2026);
        assert_eq!(save.category, ProjectCategory::Development);
        assert_eq!(save.status, ProjectStatus::Completed);
        assert!(save.tools.is_empty());
        assert_eq!(save.completion_date, None);
        assert!(!save.is_featured);
    }

    #[test]
    fn blank_title_is_rejected() {
        let result = form(serde_json::json!({"title": "  "})).into_save(Vec::new(), Vec::new(), 2026);
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn list_fields_use_their_separators() {
        let save = form(serde_json::json!({
            "title": "Site",
            "tools": "React, Node, Vue",
            "features": "A\n\nB\n",
            "challenges": ["kept, as is"],
        }))
        .into_save(Vec::new(), Vec::new(), 2026)
        .unwrap();
        assert_eq!(save.tools, vec!["React", "Node", "Vue"]);
        assert_eq!(save.features, vec!["A", "B"]);
        assert_eq!(save.challenges, vec!["kept, as is"]);
    }

    #[test]
    fn scalars_are_coerced() {
        let save = form(serde_json::json!({
            "id": "12",
            "title": "Site",
            "completion_date": "   ",
            "year": "2019",
            "performance_score": "104",
            "lines_of_code": "abc",
            "is_featured": "on",
            "category": "mobile",
        }))
        .into_save(Vec::new(), Vec::new(), 2026)
        .unwrap();
        assert_eq!(save.id, Some(12));
        assert_eq!(save.completion_date, None);
        assert_eq!(save.year, 2019);
        assert_eq!(save.performance_score, Some(100));
        assert_eq!(save.lines_of_code, None);
        assert!(save.is_featured);
        assert_eq!(save.category, ProjectCategory::Mobile);
    }

    #[test]
    fn gallery_order_is_retained_uploaded_manual() {
        let img = |url: &str| GalleryImage {
            url: url.into(),
            alt: String::new(),
            caption: String::new(),
        };
        let save = form(serde_json::json!({
            "title": "Site",
            "gallery_urls": "https://cdn.test/manual.png\n",
        }))
        .into_save(
            vec![img("uploads/gallery/old.png")],
            vec![img("uploads/gallery/up1.png"), img("uploads/gallery/up2.png")],
            2026,
        )
        .unwrap();
        let urls: Vec<_> = save.gallery_images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "uploads/gallery/old.png",
                "uploads/gallery/up1.png",
                "uploads/gallery/up2.png",
                "https://cdn.test/manual.png",
            ]
        );
    }

    #[test]
    fn malformed_row_columns_decode_to_empty() {
        let now = chrono::Utc::now();
        let row = ProjectRow {
            id: 1,
            title: "t".into(),
            description: String::new(),
            short_description: String::new(),
            category: "unknown".into(),
            status: "completed".into(),
            client_name: String::new(),
            project_duration: String::new(),
            completion_date: None,
            year: 2024,
            image_url: String::new(),
            project_url: String::new(),
            github_url: String::new(),
            github_repo_id: None,
            tools: Some("{oops".into()),
            features: None,
            technical_features: Some("42".into()),
            creative_highlights: Some(r#"["x"]"#.into()),
            challenges: Some(String::new()),
            gallery_images: Some("[1,2]".into()),
            timeline: None,
            design_concept: String::new(),
            color_palette: String::new(),
            typography: String::new(),
            creative_challenge: String::new(),
            creative_approach: String::new(),
            creative_solution: String::new(),
            inspiration_source: String::new(),
            target_audience: String::new(),
            lessons_learned: String::new(),
            results_impact: String::new(),
            performance_score: None,
            lines_of_code: None,
            components_count: None,
            development_weeks: None,
            is_featured: false,
            created_at: now,
            updated_at: now,
        };
        let project = Project::from(row);
        assert!(project.tools.is_empty());
        assert!(project.features.is_empty());
        assert!(project.technical_features.is_empty());
        assert_eq!(project.creative_highlights, vec!["x"]);
        assert!(project.gallery_images.is_empty());
        assert_eq!(project.category, ProjectCategory::Development);
    }
}
