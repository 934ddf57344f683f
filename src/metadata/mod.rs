use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{Column, Relationship, Table};

pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_CULTURE: &str = "en-US";

#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct DataModel {
    tables: Vec<Table>,
    relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    culture: Option<String>,
}

/// In-memory PBIR report model.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Metadata {
    version: String,
    name: String,
    description: String,
    datamodel: DataModel,
    settings: Settings,
    // Report pages are not modelled; kept as-is so load then save preserves them
    reports: Vec<Value>,
}

/// Summary returned by `MetadataHandler::get_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub table_count: usize,
    pub table_names: Vec<String>,
}

impl DataModel {
    pub fn new(tables: Vec<Table>, relationships: Vec<Relationship>) -> Self {
        Self { tables, relationships }
    }
}

impl Settings {
    pub fn new(culture: Option<&str>) -> Self {
        Self {
            culture: culture.map(str::to_string),
        }
    }
}

impl Metadata {
    /// Fresh model with no tables, stamped with the default version and culture.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            datamodel: DataModel::default(),
            settings: Settings::new(Some(DEFAULT_CULTURE)),
            reports: Vec::new(),
        }
    }

    pub fn from_parts(
        version: String,
        name: String,
        description: String,
        datamodel: DataModel,
        settings: Settings,
        reports: Vec<Value>,
    ) -> Self {
        Self {
            version,
            name,
            description,
            datamodel,
            settings,
            reports,
        }
    }

    pub fn tables(&self) -> &[Table] {
        &self.datamodel.tables
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.datamodel.relationships
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.datamodel.tables.iter().any(|t| t.name() == name)
    }

    pub fn push_table(&mut self, name: &str, columns: Vec<Column>) {
        self.datamodel.tables.push(Table::new(name, columns));
    }

    pub fn push_relationship(&mut self, from_table: &str, to_table: &str) {
        self.datamodel.relationships.push(Relationship::new(from_table, to_table));
    }

    pub fn info(&self) -> MetadataInfo {
        MetadataInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            table_count: self.datamodel.tables.len(),
            table_names: self.datamodel.tables.iter().map(|t| t.name().clone()).collect(),
        }
    }
}
