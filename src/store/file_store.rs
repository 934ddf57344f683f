use std::{
    collections::HashSet,
    fs::Permissions,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    metadata::{DEFAULT_VERSION, DataModel, Metadata, Settings},
    schema::{Relationship, Table},
    store::{Store, StoreError, StoreLayout, is_contained},
};

// Root document. Tables written here are referenced by path, one file per table.
#[derive(Serialize, Deserialize)]
struct DefinitionFile {
    #[serde(default = "default_version")]
    version: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    datamodel: DataModelFile,
    #[serde(default)]
    reports: Vec<Value>,
    #[serde(default)]
    settings: Settings,
}

#[derive(Serialize, Deserialize, Default)]
struct DataModelFile {
    #[serde(default)]
    tables: Vec<TableEntry>,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

// Single-file projects keep their tables inline in the root document
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TableEntry {
    Reference(TableRef),
    Inline(Table),
}

#[derive(Serialize, Deserialize)]
struct TableRef {
    name: String,
    path: String,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn invalid(path: &Path, message: impl Into<String>) -> StoreError {
    StoreError::DeserializationError {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn check_table(table: &Table, source: &Path) -> Result<(), StoreError> {
    if table.name().trim().is_empty() {
        return Err(invalid(source, "table name must not be empty"));
    }
    if table.columns().iter().any(|c| c.name().trim().is_empty()) {
        return Err(invalid(
            source,
            format!("table '{}' has a column without a name", table.name()),
        ));
    }
    Ok(())
}

// Existing documents keep their mode, new ones get the usual rw-r--r--
fn document_permissions(path: &Path) -> Option<Permissions> {
    match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_document_permissions(),
    }
}

#[cfg(unix)]
fn default_document_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_document_permissions() -> Option<Permissions> {
    None
}

pub struct FileStore<'a> {
    base_path: &'a Path,
    layout: &'a StoreLayout,
}

impl<'a> FileStore<'a> {
    pub fn new(base_path: &'a Path, layout: &'a StoreLayout) -> Self {
        Self {
            base_path,
            layout,
        }
    }

    pub fn definition_path(&self) -> PathBuf {
        self.base_path.join(self.layout.definition_file())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
            _ => StoreError::from(err),
        })?;
        debug!(path = %path.display(), bytes = text.len(), "read PBIR document");

        serde_json::from_str(&text).map_err(|err| invalid(path, err.to_string()))
    }

    // Written to a sibling temp file first, then renamed over the target
    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let mut text = serde_json::to_string_pretty(value)?;
        text.push('\n');

        let dir = path.parent().unwrap_or(self.base_path);
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        if let Some(permissions) = document_permissions(path) {
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|err| StoreError::from(err.error))?;

        debug!(path = %path.display(), bytes = text.len(), "wrote PBIR document");
        Ok(())
    }

    fn read_table(&self, entry: TableEntry, definition_path: &Path) -> Result<Table, StoreError> {
        let table_ref = match entry {
            TableEntry::Inline(table) => {
                check_table(&table, definition_path)?;
                return Ok(table);
            }
            TableEntry::Reference(table_ref) => table_ref,
        };

        if !is_contained(Path::new(&table_ref.path)) {
            return Err(invalid(
                definition_path,
                format!("table path '{}' points outside the project directory", table_ref.path),
            ));
        }

        let table_path = self.base_path.join(&table_ref.path);
        let table: Table = self.read_json(&table_path)?;
        check_table(&table, &table_path)?;

        if *table.name() != table_ref.name {
            return Err(invalid(
                &table_path,
                format!(
                    "table is named '{}' but referenced as '{}'",
                    table.name(),
                    table_ref.name
                ),
            ));
        }

        Ok(table)
    }

    // Drops table documents left behind by an earlier save of a larger model
    fn remove_stale_table_files(&self, keep: &HashSet<String>) -> Result<(), StoreError> {
        let dir = self.base_path.join(self.layout.tables_dir());
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if !StoreLayout::is_table_file_name(file_name)
                || keep.contains(file_name)
                || !entry.file_type()?.is_file()
            {
                continue;
            }

            std::fs::remove_file(entry.path())?;
            debug!(path = %entry.path().display(), "removed stale table document");
        }
        Ok(())
    }
}

impl<'a> Store for FileStore<'a> {
    fn read_metadata(&self) -> Result<Metadata, StoreError> {
        if !self.base_path.is_dir() {
            return Err(StoreError::NotFound(self.base_path.to_path_buf()));
        }

        let definition_path = self.definition_path();
        let definition: DefinitionFile = self.read_json(&definition_path)?;

        if definition.name.trim().is_empty() {
            return Err(invalid(&definition_path, "field `name` must not be empty"));
        }

        let mut tables = Vec::with_capacity(definition.datamodel.tables.len());
        for entry in definition.datamodel.tables {
            tables.push(self.read_table(entry, &definition_path)?);
        }

        Ok(Metadata::from_parts(
            definition.version,
            definition.name,
            definition.description,
            DataModel::new(tables, definition.datamodel.relationships),
            definition.settings,
            definition.reports,
        ))
    }

    fn write_metadata(&self, metadata: &Metadata) -> Result<(), StoreError> {
        std::fs::create_dir_all(self.base_path)?;

        // Table documents go first so the root never references a file that does not exist yet
        let mut table_entries = Vec::with_capacity(metadata.tables().len());
        let mut written = HashSet::new();
        for (ordinal, table) in metadata.tables().iter().enumerate() {
            let relative = self.layout.table_file(ordinal, table.name());
            let path = self.base_path.join(&relative);
            self.write_json(&path, table)?;

            if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
                written.insert(file_name.to_string());
            }
            table_entries.push(TableEntry::Reference(TableRef {
                name: table.name().clone(),
                path: relative,
            }));
        }

        let definition = DefinitionFile {
            version: metadata.version().clone(),
            name: metadata.name().clone(),
            description: metadata.description().clone(),
            datamodel: DataModelFile {
                tables: table_entries,
                relationships: metadata.relationships().to_vec(),
            },
            reports: metadata.reports().clone(),
            settings: metadata.settings().clone(),
        };
        self.write_json(&self.definition_path(), &definition)?;

        self.remove_stale_table_files(&written)
    }
}
