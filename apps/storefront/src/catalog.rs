//! Catalog source: reads the book list from a JSON file.
//!
//! The storefront never writes the catalog back.

use std::fs;
use std::path::Path;

use tracing::info;

use goonj_core::{Book, Catalog, ValidationError};

/// Why a catalog file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Could not read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog contains an invalid book: {0}")]
    Invalid(#[from] ValidationError),
}

/// Loads and validates the catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = fs::read_to_string(path)?;
    let books: Vec<Book> = serde_json::from_str(&raw)?;
    let catalog = Catalog::from_books(books)?;

    info!(path = %path.display(), books = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/books.json")
    }

    #[test]
    fn test_loads_bundled_catalog() {
        let catalog = load_catalog(&sample_path()).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.books().iter().all(|b| b.price_cents > 0));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_catalog(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
