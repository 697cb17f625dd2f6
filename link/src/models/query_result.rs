use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::schema_field::SchemaField;

/// One result set of a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column descriptions, in column order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema: Vec<SchemaField>,

    /// Row data; absent for statements that do not return rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<JsonValue>>>,

    /// Rows returned, or rows affected when `rows` is absent
    #[serde(default)]
    pub row_count: usize,

    /// Return status of a stored procedure call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_status: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResult {
    pub fn column_names(&self) -> Vec<String> {
        let mut fields: Vec<&SchemaField> = self.schema.iter().collect();
        fields.sort_by_key(|f| f.index);
        fields.into_iter().map(|f| f.name.clone()).collect()
    }

    /// Rows affected, only meaningful for statements without a row stream
    pub fn rows_affected(&self) -> Option<u64> {
        match self.rows {
            Some(_) => None,
            None => Some(self.row_count as u64),
        }
    }
}
