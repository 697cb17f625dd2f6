use serde::{Deserialize, Serialize};

/// A diagnostic message emitted by the engine while running a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerNotice {
    /// 10 is informational; anything above is an error
    pub severity: u8,

    /// Engine message number
    pub number: i32,

    pub text: String,
}
