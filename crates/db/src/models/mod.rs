//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` row struct matching the database columns
//! - A decoded `Serialize` entity returned by read paths
//! - `Deserialize` form DTOs and the normalized save input

pub mod project;
pub mod setting;
pub mod timeline_phase;
