use derive_getters::Getters;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COLUMN_TYPE: &str = "text";

fn default_column_type() -> String {
    DEFAULT_COLUMN_TYPE.to_string()
}

/// A column of a data-model table. The type tag is free-form (`int`,
/// `datetime`, `decimal`, ...) and is not checked against a fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Column {
    name: String,
    #[serde(rename = "type", default = "default_column_type")]
    col_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Table {
    name: String,
    #[serde(default)]
    columns: Vec<Column>,
}

// Name pair only, no cardinality or filter direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Relationship {
    from_table: String,
    to_table: String,
}

impl Column {
    pub fn new(name: &str, col_type: &str) -> Self {
        Self {
            name: name.to_string(),
            col_type: col_type.to_string(),
        }
    }

    /// Column with the default `text` type.
    pub fn untyped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            col_type: default_column_type(),
        }
    }
}

impl From<(&str, &str)> for Column {
    fn from((name, col_type): (&str, &str)) -> Self {
        Column::new(name, col_type)
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::untyped(name)
    }
}

impl Table {
    pub fn new(name: &str, columns: Vec<Column>) -> Self {
        Self {
            name: name.to_string(),
            columns,
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Relationship {
    pub fn new(from_table: &str, to_table: &str) -> Self {
        Self {
            from_table: from_table.to_string(),
            to_table: to_table.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_missing_column_type_to_text() {
        let column: Column = serde_json::from_str(r#"{"name": "Comment"}"#).unwrap();

        assert_eq!(column.name(), "Comment");
        assert_eq!(column.col_type(), DEFAULT_COLUMN_TYPE);
    }

    #[test]
    fn should_serialize_column_type_under_type_key() {
        let json = serde_json::to_value(Column::new("Amount", "decimal")).unwrap();

        assert_eq!(json, serde_json::json!({"name": "Amount", "type": "decimal"}));
    }

    #[test]
    fn should_reject_column_without_name() {
        let result = serde_json::from_str::<Column>(r#"{"type": "int"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn should_accept_any_type_tag() {
        let column: Column = ("Geo", "geography-point").into();
        assert_eq!(column.col_type(), "geography-point");
    }

    #[test]
    fn should_keep_duplicate_column_names_in_order() {
        let table = Table::new("t", vec!["a".into(), ("a", "int").into(), "b".into()]);

        assert_eq!(table.column_names(), vec!["a", "a", "b"]);
        assert_eq!(table.columns()[1].col_type(), "int");
    }
}
