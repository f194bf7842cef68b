//! Site settings rules.
//!
//! Two logical stores back the admin "statistics" panel:
//!
//! - scalar configuration (`years_experience`, GitHub credentials), a plain
//!   key/value map;
//! - per-filter display counts, each a [`CountOverride`] saying whether the
//!   count is computed live or pinned to a manual value.
//!
//! The admin form still speaks flat keys (`filter_design_count`,
//! `filter_design_count_auto`); [`plan_writes`] translates them.

use std::collections::HashMap;

use serde::Serialize;

use crate::classification::ProjectCategory;
use crate::fields::parse_flag;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

pub const YEARS_EXPERIENCE: &str = "years_experience";
pub const GITHUB_USERNAME: &str = "github_username";
pub const GITHUB_TOKEN: &str = "github_token";

/// Scalar keys readable through the settings API.
pub const SCALAR_KEYS: &[&str] = &[YEARS_EXPERIENCE, GITHUB_USERNAME, GITHUB_TOKEN];

/// Keys written whenever they are submitted, even when empty.
pub const ALWAYS_PERSIST_KEYS: &[&str] = &[GITHUB_USERNAME, GITHUB_TOKEN];

/// Suffix of the companion flag that switches a count to live computation.
pub const AUTO_SUFFIX: &str = "_auto";

/// A display count on the portfolio filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountMetric {
    All,
    Development,
    Design,
    Vintage,
    Hybrid,
    Mobile,
    Other,
}

impl CountMetric {
    pub const ALL: &'static [CountMetric] = &[
        CountMetric::All,
        CountMetric::Development,
        CountMetric::Design,
        CountMetric::Vintage,
        CountMetric::Hybrid,
        CountMetric::Mobile,
        CountMetric::Other,
    ];

    /// Settings key, also stored in `count_overrides.metric`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "filter_all_count",
            Self::Development => "filter_development_count",
            Self::Design => "filter_design_count",
            Self::Vintage => "filter_vintage_count",
            Self::Hybrid => "filter_hybrid_count",
            Self::Mobile => "filter_mobile_count",
            Self::Other => "filter_other_count",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == key)
    }

    /// The project category this count covers; `None` for the total.
    pub fn category(self) -> Option<ProjectCategory> {
        match self {
            Self::All => None,
            Self::Development => Some(ProjectCategory::Development),
            Self::Design => Some(ProjectCategory::Design),
            Self::Vintage => Some(ProjectCategory::Vintage),
            Self::Hybrid => Some(ProjectCategory::Hybrid),
            Self::Mobile => Some(ProjectCategory::Mobile),
            Self::Other => Some(ProjectCategory::Other),
        }
    }
}

impl Serialize for CountMetric {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// Stored override for one display count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountOverride {
    pub metric: CountMetric,
    pub auto: bool,
    pub manual_value: Option<i64>,
}

impl CountOverride {
    /// The count to display given the live value.
    ///
    /// Auto mode always shows the live count. Manual mode shows the manual
    /// value, or the live count when no manual value was ever stored.
    pub fn effective(&self, live: i64) -> i64 {
        if self.auto {
            live
        } else {
            self.manual_value.unwrap_or(live)
        }
    }
}

/// Live project counts computed from non-deleted projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LiveCounts {
    pub total: i64,
    pub by_category: HashMap<ProjectCategory, i64>,
}

impl LiveCounts {
    pub fn get(&self, metric: CountMetric) -> i64 {
        match metric.category() {
            None => self.total,
            Some(category) => self.by_category.get(&category).copied().unwrap_or(0),
        }
    }
}

/// One resolved display count, as shown in the admin panel and on the
/// portfolio filter bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountDisplay {
    pub metric: CountMetric,
    pub live: i64,
    pub auto: bool,
    pub manual_value: Option<i64>,
    pub effective: i64,
}

/// Resolve every metric. Metrics without a stored override are automatic.
pub fn resolve_counts(overrides: &[CountOverride], live: &LiveCounts) -> Vec<CountDisplay> {
    CountMetric::ALL
        .iter()
        .map(|&metric| {
            let stored = overrides
                .iter()
                .find(|o| o.metric == metric)
                .copied()
                .unwrap_or(CountOverride {
                    metric,
                    auto: true,
                    manual_value: None,
                });
            let live_value = live.get(metric);
            CountDisplay {
                metric,
                live: live_value,
                auto: stored.auto,
                manual_value: stored.manual_value,
                effective: stored.effective(live_value),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// A single persisted change derived from the submitted settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingWrite {
    Scalar { key: &'static str, value: String },
    ManualCount { metric: CountMetric, value: i64 },
    AutoFlag { metric: CountMetric, auto: bool },
}

/// Decide which submitted values are worth persisting.
///
/// A value is written only when it is present and either a positive number,
/// an always-persist credential, or an `_auto` flag. Unknown keys are ignored.
pub fn plan_writes<'a, I>(fields: I) -> Vec<SettingWrite>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut writes = Vec::new();
    for (key, value) in fields {
        if let Some(base) = key.strip_suffix(AUTO_SUFFIX) {
            if let Some(metric) = CountMetric::parse(base) {
                writes.push(SettingWrite::AutoFlag {
                    metric,
                    auto: parse_flag(value),
                });
            }
            continue;
        }

        if let Some(metric) = CountMetric::parse(key) {
            if let Some(n) = positive_number(value) {
                writes.push(SettingWrite::ManualCount { metric, value: n });
            }
            continue;
        }

        let Some(&known) = SCALAR_KEYS.iter().find(|k| **k == key) else {
            continue;
        };
        if ALWAYS_PERSIST_KEYS.contains(&known) {
            writes.push(SettingWrite::Scalar {
                key: known,
                value: value.trim().to_string(),
            });
        } else if let Some(n) = positive_number(value) {
            writes.push(SettingWrite::Scalar {
                key: known,
                value: n.to_string(),
            });
        }
    }
    writes
}

fn positive_number(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

/// What `clear_manual_setting` removes for a given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    /// Delete the scalar row.
    Scalar(&'static str),
    /// Drop the manual value and switch the count back to automatic.
    Count(CountMetric),
}

pub fn clear_target(key: &str) -> Option<ClearTarget> {
    let key = key.trim();
    let base = key.strip_suffix(AUTO_SUFFIX).unwrap_or(key);
    if let Some(metric) = CountMetric::parse(base) {
        return Some(ClearTarget::Count(metric));
    }
    SCALAR_KEYS
        .iter()
        .find(|k| **k == key)
        .map(|k| ClearTarget::Scalar(*k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(total: i64, development: i64) -> LiveCounts {
        let mut by_category = HashMap::new();
        by_category.insert(ProjectCategory::Development, development);
        LiveCounts { total, by_category }
    }

    #[test]
    fn auto_count_ignores_manual_value() {
        let overrides = [CountOverride {
            metric: CountMetric::Development,
            auto: true,
            manual_value: Some(99),
        }];
        let resolved = resolve_counts(&overrides, &live(10, 4));
        let dev = resolved
            .iter()
            .find(|c| c.metric == CountMetric::Development)
            .unwrap();
        assert_eq!(dev.effective, 4);
    }

    #[test]
    fn manual_count_wins_when_not_auto() {
        let overrides = [CountOverride {
            metric: CountMetric::All,
            auto: false,
            manual_value: Some(25),
        }];
        let resolved = resolve_counts(&overrides, &live(10, 4));
        assert_eq!(resolved[0].metric, CountMetric::All);
        assert_eq!(resolved[0].effective, 25);
        assert_eq!(resolved[0].live, 10);
    }

    #[test]
    fn missing_override_is_automatic() {
        let resolved = resolve_counts(&[], &live(3, 2));
        assert_eq!(resolved.len(), CountMetric::ALL.len());
        assert!(resolved.iter().all(|c| c.auto));
        let design = resolved
            .iter()
            .find(|c| c.metric == CountMetric::Design)
            .unwrap();
        assert_eq!(design.effective, 0);
    }

    #[test]
    fn manual_mode_without_value_falls_back_to_live() {
        let o = CountOverride {
            metric: CountMetric::Mobile,
            auto: false,
            manual_value: None,
        };
        assert_eq!(o.effective(7), 7);
    }

    #[test]
    fn plan_writes_applies_meaningful_rule() {
        let fields = [
            ("years_experience", "0"),
            ("github_username", "octocat"),
            ("github_token", ""),
            ("filter_design_count", "12"),
            ("filter_mobile_count", "-1"),
            ("filter_mobile_count_auto", "1"),
            ("filter_design_count_auto", "0"),
            ("unrelated", "5"),
        ];
        let writes = plan_writes(fields);
        assert_eq!(
            writes,
            vec![
                SettingWrite::Scalar {
                    key: GITHUB_USERNAME,
                    value: "octocat".into()
                },
                SettingWrite::Scalar {
                    key: GITHUB_TOKEN,
                    value: String::new()
                },
                SettingWrite::ManualCount {
                    metric: CountMetric::Design,
                    value: 12
                },
                SettingWrite::AutoFlag {
                    metric: CountMetric::Mobile,
                    auto: true
                },
                SettingWrite::AutoFlag {
                    metric: CountMetric::Design,
                    auto: false
                },
            ]
        );
    }

    #[test]
    fn positive_years_are_written() {
        let writes = plan_writes([("years_experience", " 8 ")]);
        assert_eq!(
            writes,
            vec![SettingWrite::Scalar {
                key: YEARS_EXPERIENCE,
                value: "8".into()
            }]
        );
    }

    #[test]
    fn clear_targets() {
        assert_eq!(
            clear_target("filter_hybrid_count"),
            Some(ClearTarget::Count(CountMetric::Hybrid))
        );
        assert_eq!(
            clear_target("filter_hybrid_count_auto"),
            Some(ClearTarget::Count(CountMetric::Hybrid))
        );
        assert_eq!(
            clear_target("years_experience"),
            Some(ClearTarget::Scalar(YEARS_EXPERIENCE))
        );
        assert_eq!(clear_target("nope"), None);
    }

    #[test]
    fn metric_serializes_as_key() {
        let json = serde_json::to_string(&CountMetric::Vintage).unwrap();
        assert_eq!(json, "\"filter_vintage_count\"");
    }
}
