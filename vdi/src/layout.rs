//! Vector store layout detection

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// On-disk layout of a vector store directory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreLayout {
    /// Plain FAISS index with a `metadata.json` sidecar
    Faiss,
    /// llama-stack faiss provider, state in `faiss_store.db`
    LlamastackFaiss,
    /// llama-stack sqlite-vec provider, state in `sqlite-vec_store.db`
    LlamastackSqliteVec,
    Unknown,
}

/// Marker files checked in priority order; first hit wins
const DETECTION_RULES: &[(&str, StoreLayout)] = &[
    (crate::METADATA_FILE, StoreLayout::Faiss),
    (crate::SQLITE_VEC_STORE_DB, StoreLayout::LlamastackSqliteVec),
    (crate::FAISS_STORE_DB, StoreLayout::LlamastackFaiss),
];

impl StoreLayout {
    /// Detect the layout of `dir` from the marker files it contains
    ///
    /// A missing directory is not an error, it simply matches no rule.
    pub fn detect(dir: &Path) -> Self {
        DETECTION_RULES
            .iter()
            .find(|(marker, _)| dir.join(marker).exists())
            .map(|(_, layout)| *layout)
            .unwrap_or(Self::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faiss => "faiss",
            Self::LlamastackFaiss => "llamastack-faiss",
            Self::LlamastackSqliteVec => "llamastack-sqlite-vec",
            Self::Unknown => "unknown",
        }
    }

    /// Whether chunk state lives in a sqlite key/value table
    pub fn is_key_value(&self) -> bool {
        self.db_file().is_some()
    }

    /// Key/value database file for this layout, if any
    pub fn db_file(&self) -> Option<&'static str> {
        match self {
            Self::LlamastackFaiss => Some(crate::FAISS_STORE_DB),
            Self::LlamastackSqliteVec => Some(crate::SQLITE_VEC_STORE_DB),
            Self::Faiss | Self::Unknown => None,
        }
    }

    /// Full path of the key/value database inside `dir`
    pub fn db_path(&self, dir: &Path) -> Option<PathBuf> {
        self.db_file().map(|file| dir.join(file))
    }
}

impl fmt::Display for StoreLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StoreLayout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_each_marker() {
        for (marker, expected) in DETECTION_RULES {
            let temp = TempDir::new().unwrap();
            fs::write(temp.path().join(marker), "").unwrap();
            assert_eq!(StoreLayout::detect(temp.path()), *expected, "marker {}", marker);
        }
    }

    #[test]
    fn test_plain_marker_wins_over_key_value() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(crate::FAISS_STORE_DB), "").unwrap();
        fs::write(temp.path().join(crate::SQLITE_VEC_STORE_DB), "").unwrap();
        fs::write(temp.path().join(crate::METADATA_FILE), "{}").unwrap();

        assert_eq!(StoreLayout::detect(temp.path()), StoreLayout::Faiss);
    }

    #[test]
    fn test_sqlite_vec_wins_over_faiss_store() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(crate::FAISS_STORE_DB), "").unwrap();
        fs::write(temp.path().join(crate::SQLITE_VEC_STORE_DB), "").unwrap();

        assert_eq!(StoreLayout::detect(temp.path()), StoreLayout::LlamastackSqliteVec);
    }

    #[test]
    fn test_detect_empty_and_missing_dir() {
        let temp = TempDir::new().unwrap();
        assert_eq!(StoreLayout::detect(temp.path()), StoreLayout::Unknown);
        assert_eq!(
            StoreLayout::detect(&temp.path().join("does-not-exist")),
            StoreLayout::Unknown
        );
    }

    #[test]
    fn test_db_path() {
        let dir = Path::new("/data/db");
        assert_eq!(
            StoreLayout::LlamastackFaiss.db_path(dir),
            Some(PathBuf::from("/data/db/faiss_store.db"))
        );
        assert_eq!(StoreLayout::Faiss.db_path(dir), None);
        assert!(!StoreLayout::Unknown.is_key_value());
    }

    #[test]
    fn test_serializes_as_name() {
        let json = serde_json::to_string(&StoreLayout::LlamastackSqliteVec).unwrap();
        assert_eq!(json, "\"llamastack-sqlite-vec\"");
    }
}
