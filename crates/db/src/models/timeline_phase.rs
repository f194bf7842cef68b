//! Timeline phase entity model and DTOs.

use folio_core::classification::{PhaseStatus, PhaseType};
use folio_core::composite::{decode_list, split_list, Separator};
use folio_core::error::CoreError;
use folio_core::fields::{parse_id, parse_optional_date, parse_optional_int};
use folio_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `timeline_phases` table.
#[derive(Debug, Clone, FromRow)]
pub struct TimelinePhaseRow {
    pub id: DbId,
    pub project_id: DbId,
    pub phase_name: String,
    pub phase_type: Option<String>,
    pub phase_description: String,
    pub phase_details: String,
    pub week_number: Option<i32>,
    pub phase_status: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub tasks: Option<String>,
    pub deliverables: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A phase with its task lists decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePhase {
    pub id: DbId,
    pub project_id: DbId,
    pub phase_name: String,
    pub phase_type: Option<PhaseType>,
    pub phase_description: String,
    pub phase_details: String,
    pub week_number: Option<i32>,
    pub phase_status: PhaseStatus,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub tasks: Vec<String>,
    pub deliverables: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TimelinePhaseRow> for TimelinePhase {
    fn from(row: TimelinePhaseRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            phase_name: row.phase_name,
            phase_type: row.phase_type.as_deref().and_then(PhaseType::parse),
            phase_description: row.phase_description,
            phase_details: row.phase_details,
            week_number: row.week_number,
            phase_status: PhaseStatus::parse(&row.phase_status)
                .unwrap_or(PhaseStatus::SINGLE_DEFAULT),
            start_date: row.start_date,
            end_date: row.end_date,
            tasks: decode_list(row.tasks.as_deref()),
            deliverables: decode_list(row.deliverables.as_deref()),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Normalized phase values written by both save paths.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePhase {
    pub phase_name: String,
    pub phase_type: Option<PhaseType>,
    pub phase_description: String,
    pub phase_details: String,
    pub week_number: Option<i32>,
    pub phase_status: PhaseStatus,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub tasks: Vec<String>,
    pub deliverables: Vec<String>,
}

/// Single-phase form from the admin timeline editor.
///
/// Tasks and deliverables are newline-separated text. Omitted status
/// defaults to `planned`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhaseForm {
    pub phase_id: Option<String>,
    pub project_id: Option<String>,
    pub phase_name: Option<String>,
    pub phase_type: Option<String>,
    pub phase_description: Option<String>,
    pub phase_details: Option<String>,
    pub week_number: Option<String>,
    pub phase_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub tasks: Option<String>,
    pub deliverables: Option<String>,
}

impl PhaseForm {
    pub fn phase_id(&self) -> Option<DbId> {
        self.phase_id.as_deref().and_then(parse_id)
    }

    /// The owning project. Required for inserts.
    pub fn project_id(&self) -> Option<DbId> {
        self.project_id.as_deref().and_then(parse_id)
    }

    pub fn into_save(self) -> Result<SavePhase, CoreError> {
        let phase_name = self.phase_name.unwrap_or_default().trim().to_string();
        if phase_name.is_empty() {
            return Err(CoreError::Validation("Phase name is required".into()));
        }
        let lines = |v: Option<String>| split_list(v.as_deref().unwrap_or(""), Separator::Newline);

        Ok(SavePhase {
            phase_name,
            phase_type: self.phase_type.as_deref().and_then(parse_phase_type),
            phase_description: self.phase_description.unwrap_or_default().trim().to_string(),
            phase_details: self.phase_details.unwrap_or_default().trim().to_string(),
            week_number: self.week_number.as_deref().and_then(parse_optional_int),
            phase_status: self
                .phase_status
                .as_deref()
                .and_then(|s| PhaseStatus::parse(s.trim()))
                .unwrap_or(PhaseStatus::SINGLE_DEFAULT),
            start_date: self.start_date.as_deref().and_then(parse_optional_date),
            end_date: self.end_date.as_deref().and_then(parse_optional_date),
            tasks: lines(self.tasks),
            deliverables: lines(self.deliverables),
        })
    }
}

/// One phase inside a project's bulk `timeline_phases` submission.
///
/// Lists are kept only when submitted as arrays; any other shape stores an
/// empty list. Omitted status defaults to `completed`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhaseEntry {
    pub phase_name: Option<String>,
    pub phase_type: Option<String>,
    pub phase_description: Option<String>,
    pub phase_details: Option<String>,
    pub week_number: serde_json::Value,
    pub phase_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub tasks: serde_json::Value,
    pub deliverables: serde_json::Value,
}

impl PhaseEntry {
    /// Normalize; entries without a name are dropped.
    pub fn into_save(self) -> Option<SavePhase> {
        let phase_name = self.phase_name.unwrap_or_default().trim().to_string();
        if phase_name.is_empty() {
            return None;
        }
        let week_number = match &self.week_number {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(|n| i32::try_from(n).ok()),
            serde_json::Value::String(s) => parse_optional_int(s),
            _ => None,
        };

        Some(SavePhase {
            phase_name,
            phase_type: self.phase_type.as_deref().and_then(parse_phase_type),
            phase_description: self.phase_description.unwrap_or_default().trim().to_string(),
            phase_details: self.phase_details.unwrap_or_default().trim().to_string(),
            week_number,
            phase_status: self
                .phase_status
                .as_deref()
                .and_then(|s| PhaseStatus::parse(s.trim()))
                .unwrap_or(PhaseStatus::BULK_DEFAULT),
            start_date: self.start_date.as_deref().and_then(parse_optional_date),
            end_date: self.end_date.as_deref().and_then(parse_optional_date),
            tasks: string_array(&self.tasks),
            deliverables: string_array(&self.deliverables),
        })
    }
}

fn parse_phase_type(value: &str) -> Option<PhaseType> {
    PhaseType::parse(value.trim())
}

fn string_array(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}
