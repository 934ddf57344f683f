use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    error::PbirError,
    metadata::{Metadata, MetadataInfo},
    schema::{Column, Relationship, Table},
    store::{Store, StoreLayout, file_store::FileStore},
};

/// Creates, edits, loads and saves a PBIR project.
///
/// A handler starts unbound (no model). `create_new` or `load` binds a model,
/// which stays bound until it is replaced by another `create_new` or `load`.
#[derive(Debug, Default)]
pub struct MetadataHandler {
    path: Option<PathBuf>,
    layout: StoreLayout,
    metadata: Option<Metadata>,
}

impl MetadataHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers `path` for later `load`/`save` calls. Nothing is read yet.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// `with_path` followed by `load`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PbirError> {
        let mut handler = Self::with_path(path);
        handler.load()?;
        Ok(handler)
    }

    pub fn with_layout(mut self, layout: StoreLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.metadata.is_some()
    }

    /// Replaces the in-memory model with an empty one.
    pub fn create_new(&mut self, name: &str, description: &str) -> Result<&Metadata, PbirError> {
        if name.trim().is_empty() {
            return Err(PbirError::InvalidArgument("name must not be empty".to_string()));
        }

        debug!(name, "creating new PBIR metadata");
        Ok(&*self.metadata.insert(Metadata::new(name, description)))
    }

    /// Replaces the in-memory model with the one stored at the handler's path.
    pub fn load(&mut self) -> Result<&Metadata, PbirError> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| PbirError::InvalidArgument("no path to load from".to_string()))?;

        let metadata = FileStore::new(path, &self.layout).read_metadata()?;
        info!(path = %path.display(), tables = metadata.tables().len(), "loaded PBIR metadata");

        Ok(&*self.metadata.insert(metadata))
    }

    /// Writes the model to `output_path`, or to the handler's path when `None`.
    /// Existing files at the destination are overwritten.
    pub fn save(&self, output_path: Option<&Path>) -> Result<(), PbirError> {
        let metadata = self.require_metadata("save")?;
        let path = output_path
            .or(self.path.as_deref())
            .ok_or_else(|| PbirError::InvalidArgument("no path specified for saving".to_string()))?;

        FileStore::new(path, &self.layout).write_metadata(metadata)?;
        info!(path = %path.display(), tables = metadata.tables().len(), "saved PBIR metadata");

        Ok(())
    }

    /// Appends a table. Duplicate table names are kept as separate entries.
    pub fn add_table(&mut self, table_name: &str, columns: Vec<Column>) -> Result<(), PbirError> {
        let metadata = self.require_metadata_mut("add_table")?;
        if table_name.trim().is_empty() {
            return Err(PbirError::InvalidArgument("table name must not be empty".to_string()));
        }
        if columns.iter().any(|c| c.name().trim().is_empty()) {
            return Err(PbirError::InvalidArgument(format!(
                "table '{}' has a column without a name",
                table_name
            )));
        }

        debug!(table = table_name, columns = columns.len(), "adding table");
        metadata.push_table(table_name, columns);
        Ok(())
    }

    pub fn add_relationship(&mut self, from_table: &str, to_table: &str) -> Result<(), PbirError> {
        let metadata = self.require_metadata_mut("add_relationship")?;
        for table_name in [from_table, to_table] {
            if table_name.trim().is_empty() {
                return Err(PbirError::InvalidArgument(
                    "relationship table name must not be empty".to_string(),
                ));
            }
            if !metadata.has_table(table_name) {
                return Err(PbirError::InvalidArgument(format!("unknown table '{}'", table_name)));
            }
        }

        metadata.push_relationship(from_table, to_table);
        Ok(())
    }

    pub fn get_tables(&self) -> Result<&[Table], PbirError> {
        Ok(self.require_metadata("get_tables")?.tables())
    }

    pub fn get_relationships(&self) -> Result<&[Relationship], PbirError> {
        Ok(self.require_metadata("get_relationships")?.relationships())
    }

    pub fn get_info(&self) -> Result<MetadataInfo, PbirError> {
        Ok(self.require_metadata("get_info")?.info())
    }

    fn require_metadata(&self, operation: &str) -> Result<&Metadata, PbirError> {
        self.metadata.as_ref().ok_or_else(|| missing_metadata(operation))
    }

    fn require_metadata_mut(&mut self, operation: &str) -> Result<&mut Metadata, PbirError> {
        self.metadata.as_mut().ok_or_else(|| missing_metadata(operation))
    }
}

fn missing_metadata(operation: &str) -> PbirError {
    PbirError::InvalidState(format!(
        "{} requires metadata; call create_new or load first",
        operation
    ))
}
