//! Repository for `site_settings` and `count_overrides`.

use std::collections::HashMap;

use folio_core::settings::{CountMetric, CountOverride};
use sqlx::PgPool;

use crate::models::setting::{CountOverrideRow, SiteSetting};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, setting_key, setting_value, created_at, updated_at";

/// Provides read/write access to scalar settings and count overrides.
pub struct SettingRepo;

impl SettingRepo {
    /// Fetch the stored values of `keys`. Absent keys are absent from the map.
    pub async fn get_subset(
        pool: &PgPool,
        keys: &[&str],
    ) -> Result<HashMap<String, String>, sqlx::Error> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let query = format!("SELECT {COLUMNS} FROM site_settings WHERE setting_key = ANY($1)");
        let rows = sqlx::query_as::<_, SiteSetting>(&query)
            .bind(&keys)
            .fetch_all(pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.setting_key, row.setting_value))
            .collect())
    }

    /// Single scalar lookup.
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT setting_value FROM site_settings WHERE setting_key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite a scalar setting.
    pub async fn upsert_scalar(pool: &PgPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO site_settings (setting_key, setting_value)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_site_settings_key
             DO UPDATE SET setting_value = EXCLUDED.setting_value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove a scalar setting. Returns `true` if a row was removed.
    pub async fn delete_scalar(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM site_settings WHERE setting_key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every stored count override with a recognized metric.
    pub async fn list_overrides(pool: &PgPool) -> Result<Vec<CountOverride>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CountOverrideRow>(
            "SELECT metric, auto, manual_value, updated_at FROM count_overrides ORDER BY metric",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .filter_map(CountOverrideRow::into_override)
            .collect())
    }

    /// Store a manual value. The auto flag is left as it is.
    pub async fn set_manual(pool: &PgPool, metric: CountMetric, value: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO count_overrides (metric, manual_value)
             VALUES ($1, $2)
             ON CONFLICT (metric)
             DO UPDATE SET manual_value = EXCLUDED.manual_value, updated_at = NOW()",
        )
        .bind(metric.as_str())
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Switch a count between live and manual display.
    pub async fn set_auto(pool: &PgPool, metric: CountMetric, auto: bool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO count_overrides (metric, auto)
             VALUES ($1, $2)
             ON CONFLICT (metric)
             DO UPDATE SET auto = EXCLUDED.auto, updated_at = NOW()",
        )
        .bind(metric.as_str())
        .bind(auto)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Drop the manual value and return the count to live display.
    pub async fn reset_override(pool: &PgPool, metric: CountMetric) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO count_overrides (metric, auto, manual_value)
             VALUES ($1, TRUE, NULL)
             ON CONFLICT (metric)
             DO UPDATE SET auto = TRUE, manual_value = NULL, updated_at = NOW()",
        )
        .bind(metric.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }
}
