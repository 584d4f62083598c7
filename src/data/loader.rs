//! RON catalog loader
//!
//! A catalog file fully replaces the builtin table; there is no
//! per-entry merging. Anything that fails to read, parse or validate
//! falls back to the builtin catalog with a warning.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::stats::{CatalogError, StatCatalog};

/// Catalog file failures.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("catalog failed validation: {0}")]
    Invalid(#[from] CatalogError),
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] ron::Error),
}

/// Load and validate a catalog from a RON file.
pub fn load_catalog(path: &Path) -> Result<StatCatalog, DataError> {
    let content = fs::read_to_string(path)?;
    let catalog: StatCatalog = ron::from_str(&content)?;
    catalog.validate()?;
    Ok(catalog)
}

/// Load a catalog, falling back to the builtin table when the file is
/// missing or broken.
pub fn load_or_builtin(path: &Path) -> StatCatalog {
    if path.exists() {
        match load_catalog(path) {
            Ok(catalog) => {
                log::info!("loaded stat catalog from {}", path.display());
                return catalog;
            }
            Err(e) => {
                log::warn!(
                    "failed to load catalog from {}: {}. Using builtin.",
                    path.display(),
                    e
                );
            }
        }
    }
    StatCatalog::builtin()
}

/// Write the builtin catalog to a RON file, as a starting point for
/// external tuning.
pub fn export_catalog(path: &Path) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = ron::ser::to_string_pretty(&StatCatalog::builtin(), Default::default())?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lootforge-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_export_then_load_round_trips() {
        let path = temp_path("roundtrip.ron");
        export_catalog(&path).expect("export");
        let loaded = load_catalog(&path).expect("load");
        assert_eq!(loaded, StatCatalog::builtin());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = temp_path("does-not-exist.ron");
        assert_eq!(load_or_builtin(&path), StatCatalog::builtin());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let path = temp_path("corrupt.ron");
        fs::write(&path, "this is not a catalog").unwrap();
        assert!(matches!(load_catalog(&path), Err(DataError::Parse(_))));
        assert_eq!(load_or_builtin(&path), StatCatalog::builtin());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_catalog_is_rejected() {
        let path = temp_path("invalid.ron");
        fs::write(
            &path,
            r#"(
                stats: {
                    Damage: (key: Damage, kind: Flat, decimal_places: 9,
                             range: (min: 4.0, max: 12.0)),
                },
                types: {},
            )"#,
        )
        .unwrap();
        assert!(matches!(load_catalog(&path), Err(DataError::Invalid(_))));
        let _ = fs::remove_file(&path);
    }
}
