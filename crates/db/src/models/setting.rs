//! Site settings and count override rows.

use folio_core::settings::{CountMetric, CountOverride};
use folio_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `site_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteSetting {
    pub id: DbId,
    pub setting_key: String,
    pub setting_value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `count_overrides` table.
#[derive(Debug, Clone, FromRow)]
pub struct CountOverrideRow {
    pub metric: String,
    pub auto: bool,
    pub manual_value: Option<i64>,
    pub updated_at: Timestamp,
}

impl CountOverrideRow {
    /// Rows with an unrecognized metric are ignored.
    pub fn into_override(self) -> Option<CountOverride> {
        CountMetric::parse(&self.metric).map(|metric| CountOverride {
            metric,
            auto: self.auto,
            manual_value: self.manual_value,
        })
    }
}
