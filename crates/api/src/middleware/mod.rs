//! Request extractors for authentication.
//!
//! - [`auth::AdminSession`] -- Requires a valid admin session.

pub mod auth;
