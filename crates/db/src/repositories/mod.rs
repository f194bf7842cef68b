//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod project_repo;
pub mod setting_repo;
pub mod timeline_phase_repo;

pub use project_repo::ProjectRepo;
pub use setting_repo::SettingRepo;
pub use timeline_phase_repo::TimelinePhaseRepo;
