//! Catalog data loading
//!
//! Loads the stat catalog from an external RON file, allowing tuning
//! without a rebuild; falls back to the builtin table.

pub mod loader;

pub use loader::{export_catalog, load_catalog, load_or_builtin, DataError};
