//! Filter catalog loading.
//!
//! The built-in catalog is the EasyList subset shipped with the extension.
//! A JSON file can replace any of its lists; keys it omits keep the defaults.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::types::catalog::FilterCatalog;
use crate::types::errors::CatalogError;

/// Environment variable pointing at a catalog JSON file.
pub const CATALOG_ENV: &str = "CALM_BUDDY_CATALOG";

/// Reads a catalog from a JSON file.
pub fn load_catalog_file(path: &Path) -> Result<FilterCatalog, CatalogError> {
    let content = fs::read_to_string(path).map_err(|e| {
        CatalogError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let catalog: FilterCatalog = serde_json::from_str(&content).map_err(|e| {
        CatalogError::ParseError(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    info!(
        path = %path.display(),
        selectors = catalog.selectors.len(),
        domains = catalog.domains.len(),
        "loaded filter catalog"
    );
    Ok(catalog)
}

/// Resolves the catalog for this process: an explicit path, then
/// `CALM_BUDDY_CATALOG`, then the built-in lists.
pub fn load_catalog(path_override: Option<&Path>) -> Result<FilterCatalog, CatalogError> {
    if let Some(path) = path_override {
        return load_catalog_file(path);
    }
    match std::env::var(CATALOG_ENV) {
        Ok(path) if !path.is_empty() => load_catalog_file(Path::new(&path)),
        _ => {
            debug!("using built-in filter catalog");
            Ok(FilterCatalog::default())
        }
    }
}
