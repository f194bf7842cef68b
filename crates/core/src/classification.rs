//! Enum-like string columns: project category/status and phase type/status.
//!
//! The database stores these as plain `TEXT`; each enum's [`as_str`] value is
//! exactly what is persisted. Parsing is lenient at the form boundary: an
//! unknown value falls back to the column's documented default instead of
//! failing the save.
//!
//! [`as_str`]: ProjectCategory::as_str

use serde::{Deserialize, Serialize};

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// The value stored in the database.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Parse a stored or submitted value. Case and surrounding
            /// whitespace are ignored.
            pub fn parse(value: &str) -> Option<Self> {
                let value = value.trim().to_ascii_lowercase();
                match value.as_str() {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_enum! {
    /// Portfolio filter category of a project.
    ProjectCategory {
        Development = "development",
        Design = "design",
        Vintage = "vintage",
        Hybrid = "hybrid",
        Mobile = "mobile",
        Other = "other",
    }
}

define_text_enum! {
    /// Delivery status of a project.
    ProjectStatus {
        Completed = "completed",
        InProgress = "in_progress",
        Planned = "planned",
        Archived = "archived",
    }
}

define_text_enum! {
    /// Kind of work a timeline phase describes.
    PhaseType {
        Planning = "planning",
        Design = "design",
        Development = "development",
        Testing = "testing",
        Deployment = "deployment",
        Challenge = "challenge",
        Approach = "approach",
        Solution = "solution",
    }
}

define_text_enum! {
    /// Progress state of a timeline phase.
    PhaseStatus {
        Planned = "planned",
        InProgress = "in_progress",
        Completed = "completed",
        Skipped = "skipped",
    }
}

impl ProjectCategory {
    /// Category used when the submitted value is missing or unknown.
    pub const DEFAULT: ProjectCategory = ProjectCategory::Development;

    /// Parse, falling back to [`ProjectCategory::DEFAULT`].
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::DEFAULT)
    }

    /// Human-readable label shown on filter buttons.
    pub fn label(self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Design => "Design",
            Self::Vintage => "Vintage",
            Self::Hybrid => "Hybrid",
            Self::Mobile => "Mobile",
            Self::Other => "Other",
        }
    }
}

impl ProjectStatus {
    /// Status used when the submitted value is missing or unknown.
    pub const DEFAULT: ProjectStatus = ProjectStatus::Completed;

    /// Parse, falling back to [`ProjectStatus::DEFAULT`].
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::DEFAULT)
    }
}

impl PhaseStatus {
    /// Default for phases created one at a time from the phase editor.
    pub const SINGLE_DEFAULT: PhaseStatus = PhaseStatus::Planned;

    /// Default for phases arriving in bulk with a saved project. Those phases
    /// describe work that already happened, so they start out completed.
    pub const BULK_DEFAULT: PhaseStatus = PhaseStatus::Completed;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            ProjectCategory::parse(" Design "),
            Some(ProjectCategory::Design)
        );
        assert_eq!(
            ProjectStatus::parse("IN_PROGRESS"),
            Some(ProjectStatus::InProgress)
        );
    }

    #[test]
    fn unknown_category_falls_back_to_development() {
        assert_eq!(
            ProjectCategory::parse_or_default("sculpture"),
            ProjectCategory::Development
        );
        assert_eq!(
            ProjectCategory::parse_or_default(""),
            ProjectCategory::Development
        );
    }

    #[test]
    fn unknown_status_falls_back_to_completed() {
        assert_eq!(
            ProjectStatus::parse_or_default("shipped"),
            ProjectStatus::Completed
        );
    }

    #[test]
    fn stored_values_round_trip_through_parse() {
        for category in ProjectCategory::ALL {
            assert_eq!(ProjectCategory::parse(category.as_str()), Some(*category));
        }
        for phase_type in PhaseType::ALL {
            assert_eq!(PhaseType::parse(phase_type.as_str()), Some(*phase_type));
        }
        for status in PhaseStatus::ALL {
            assert_eq!(PhaseStatus::parse(status.as_str()), Some(*status));
        }
    }

    #[test]
    fn serde_uses_stored_value() {
        let json = serde_json::to_string(&PhaseStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn phase_status_defaults_differ_by_entry_point() {
        assert_eq!(PhaseStatus::SINGLE_DEFAULT, PhaseStatus::Planned);
        assert_eq!(PhaseStatus::BULK_DEFAULT, PhaseStatus::Completed);
    }
}
