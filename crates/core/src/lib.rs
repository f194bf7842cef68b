//! Domain logic for the portfolio site.
//!
//! Everything here is free of database access so that the repository layer,
//! the HTTP handlers, and the tests can share one definition of how form input
//! becomes a stored project.

pub mod classification;
pub mod composite;
pub mod error;
pub mod fields;
pub mod gallery;
pub mod import;
pub mod settings;
pub mod sitemap;
pub mod types;
pub mod upload;
