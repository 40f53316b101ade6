//! `SQLite`-backed content store.
//!
//! Holds message records, body parts and attachment records for the viewer.
//! The schema is private to this module.

mod repository;

pub use repository::SqliteContentStore;
