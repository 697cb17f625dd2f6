use serde::{Deserialize, Serialize};

use super::sql_data_type::SqlDataType;

/// Column description within a result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,

    pub data_type: SqlDataType,

    /// Zero-based position of the column
    pub index: usize,
}
