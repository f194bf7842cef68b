//! Turning a GitHub repository description into a portfolio project.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::classification::ProjectCategory;
use crate::types::DbId;

/// Languages that mark a repository as development work.
const DEVELOPMENT_LANGUAGES: &[&str] = &["javascript", "html", "css", "php", "python", "java"];

/// Repository fields used by the import. Mirrors the GitHub REST payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubRepository {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    /// ISO-8601 creation time, e.g. `2021-04-02T10:00:00Z`.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub fork: bool,
}

/// Project fields derived from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedProject {
    pub github_repo_id: DbId,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub category: ProjectCategory,
    pub year: i32,
    pub tools: Vec<String>,
    pub github_url: String,
    pub project_url: String,
}

/// `"my-cool_app"` -> `"My Cool App"`.
pub fn title_from_repo_name(name: &str) -> String {
    name.replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keyword/language heuristic for an imported repository's category.
pub fn detect_category(name: &str, description: &str, language: &str) -> ProjectCategory {
    let name = name.to_lowercase();
    let description = description.to_lowercase();
    let language = language.to_lowercase();

    if DEVELOPMENT_LANGUAGES.contains(&language.as_str())
        || name.contains("app")
        || name.contains("website")
        || description.contains("application")
        || description.contains("website")
    {
        return ProjectCategory::Development;
    }

    if name.contains("design") || description.contains("design") {
        return ProjectCategory::Design;
    }

    ProjectCategory::Development
}

/// Description to use when the repository has none.
pub fn fallback_description(language: Option<&str>) -> String {
    match language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(language) => format!("A {language} project imported from GitHub."),
        None => "A project imported from GitHub.".to_string(),
    }
}

/// Year the repository was created; `current_year` when unknown.
pub fn creation_year(created_at: Option<&str>, current_year: i32) -> i32 {
    created_at
        .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|dt| dt.year())
        .unwrap_or(current_year)
}

/// Derive every project field the import writes.
pub fn derive_project(repo: &GithubRepository, current_year: i32) -> ImportedProject {
    let language = repo.language.as_deref().unwrap_or("");
    let description = repo
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_description(repo.language.as_deref()));

    let mut tools: Vec<String> = Vec::new();
    for tool in std::iter::once(language).chain(repo.topics.iter().map(String::as_str)) {
        let tool = tool.trim();
        if !tool.is_empty() && !tools.iter().any(|t| t.eq_ignore_ascii_case(tool)) {
            tools.push(tool.to_string());
        }
    }

    ImportedProject {
        github_repo_id: repo.id,
        title: title_from_repo_name(&repo.name),
        short_description: short_description(&description),
        category: detect_category(
            &repo.name,
            repo.description.as_deref().unwrap_or(""),
            language,
        ),
        description,
        year: creation_year(repo.created_at.as_deref(), current_year),
        tools,
        github_url: repo.html_url.clone(),
        project_url: repo
            .homepage
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string(),
    }
}

/// First sentence of `text`, capped at 160 characters.
fn short_description(text: &str) -> String {
    let sentence = text.split_inclusive(". ").next().unwrap_or(text).trim();
    if sentence.chars().count() <= 160 {
        sentence.to_string()
    } else {
        let cut: String = sentence.chars().take(157).collect();
        format!("{}...", cut.trim_end())
    }
}
