use serde::{Deserialize, Serialize};

/// Column types the endpoint reports in result schemas.
///
/// `Timestamp`/`DateTime` values travel as RFC 3339 strings or epoch
/// microseconds; `Bytes` values travel base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlDataType {
    Boolean,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal { precision: u8, scale: u8 },
    Text,
    Timestamp,
    DateTime,
    Date,
    Time,
    Json,
    Uuid,
    Bytes,
}

impl SqlDataType {
    pub fn is_temporal_instant(&self) -> bool {
        matches!(self, SqlDataType::Timestamp | SqlDataType::DateTime)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, SqlDataType::Bytes)
    }
}
