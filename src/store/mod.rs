pub mod file_store;

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::metadata::Metadata;

// Store is always owned by a MetadataHandler for the duration of one load or save
pub trait Store {
    fn read_metadata(&self) -> Result<Metadata, StoreError>;
    fn write_metadata(&self, metadata: &Metadata) -> Result<(), StoreError>;
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("StoreError - not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("StoreError - I/O Error: {0}")]
    IoError(String),
    #[error("StoreError - Deserialization Error in {}: {message}", path.display())]
    DeserializationError { path: PathBuf, message: String },
    #[error("StoreError - Serialization Error: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err.to_string())
    }
}

/// File naming inside a PBIR project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    definition_file: String,
    tables_dir: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum StoreLayoutError {
    #[error("Layout entry '{0}' must not be empty.")]
    Empty(&'static str),
    #[error("Layout entry '{0}' must be a relative path inside the project directory: {1}")]
    EscapesRoot(&'static str, String),
}

impl StoreLayout {
    pub const DEFAULT_DEFINITION_FILE: &'static str = "definition.pbir";
    pub const DEFAULT_TABLES_DIR: &'static str = "tables";
    // Keeps table file names well under the usual 255-byte file name limit
    const MAX_TABLE_FILE_STEM: usize = 64;

    pub fn new(definition_file: &str, tables_dir: &str) -> Result<Self, StoreLayoutError> {
        Self::check("definition_file", definition_file)?;
        Self::check("tables_dir", tables_dir)?;

        Ok(Self {
            definition_file: definition_file.to_string(),
            tables_dir: tables_dir.to_string(),
        })
    }

    pub fn definition_file(&self) -> &str {
        &self.definition_file
    }

    pub fn tables_dir(&self) -> &str {
        &self.tables_dir
    }

    /// Relative path of the document holding the table at `ordinal`.
    pub fn table_file(&self, ordinal: usize, table_name: &str) -> String {
        let sanitized: String = table_name
            .chars()
            .take(Self::MAX_TABLE_FILE_STEM)
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{}/{:03}-{}.json", self.tables_dir, ordinal, sanitized)
    }

    /// True for file names shaped like the ones `table_file` produces (`NNN-<name>.json`).
    pub fn is_table_file_name(file_name: &str) -> bool {
        let Some(stem) = file_name.strip_suffix(".json") else {
            return false;
        };
        let digits = stem.chars().take_while(char::is_ascii_digit).count();
        digits >= 3 && stem[digits..].starts_with('-')
    }

    fn check(entry: &'static str, value: &str) -> Result<(), StoreLayoutError> {
        if value.trim().is_empty() {
            return Err(StoreLayoutError::Empty(entry));
        }
        if !is_contained(Path::new(value)) {
            return Err(StoreLayoutError::EscapesRoot(entry, value.to_string()));
        }
        Ok(())
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            definition_file: Self::DEFAULT_DEFINITION_FILE.to_string(),
            tables_dir: Self::DEFAULT_TABLES_DIR.to_string(),
        }
    }
}

/// True when `path` is relative and never climbs above its starting directory.
pub(crate) fn is_contained(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_standard_pbir_names_by_default() {
        let layout = StoreLayout::default();

        assert_eq!(layout.definition_file(), "definition.pbir");
        assert_eq!(layout.tables_dir(), "tables");
    }

    #[test]
    fn should_reject_empty_layout_entries() {
        assert_eq!(
            StoreLayout::new("", "tables"),
            Err(StoreLayoutError::Empty("definition_file"))
        );
        assert_eq!(
            StoreLayout::new("definition.pbir", "  "),
            Err(StoreLayoutError::Empty("tables_dir"))
        );
    }

    #[test]
    fn should_reject_layout_escaping_project_directory() {
        assert!(matches!(
            StoreLayout::new("../definition.pbir", "tables"),
            Err(StoreLayoutError::EscapesRoot("definition_file", _))
        ));
        assert!(matches!(
            StoreLayout::new("definition.pbir", "/tmp/tables"),
            Err(StoreLayoutError::EscapesRoot("tables_dir", _))
        ));
    }

    #[test]
    fn should_sanitize_table_file_names() {
        let layout = StoreLayout::default();

        assert_eq!(layout.table_file(0, "Sales"), "tables/000-Sales.json");
        assert_eq!(
            layout.table_file(12, "Order Lines/2024"),
            "tables/012-Order_Lines_2024.json"
        );
    }

    #[test]
    fn should_cap_table_file_name_length() {
        let layout = StoreLayout::default();

        let file = layout.table_file(7, &"A".repeat(300));
        assert_eq!(file, format!("tables/007-{}.json", "A".repeat(64)));

        // multi-byte names are capped by characters, before sanitizing
        let file = layout.table_file(0, &"é".repeat(100));
        assert_eq!(file, format!("tables/000-{}.json", "_".repeat(64)));
    }

    #[test]
    fn should_recognize_table_file_names() {
        assert!(StoreLayout::is_table_file_name("000-Sales.json"));
        assert!(StoreLayout::is_table_file_name("1234-.json"));
        assert!(!StoreLayout::is_table_file_name("00-Sales.json"));
        assert!(!StoreLayout::is_table_file_name("000Sales.json"));
        assert!(!StoreLayout::is_table_file_name("000-Sales.txt"));
        assert!(!StoreLayout::is_table_file_name("notes.json"));
    }
}
