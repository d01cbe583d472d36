//! Identifier field names of a primary table.

use serde::{Deserialize, Serialize};

/// Column names used to resolve literal identifier statements and to read
/// signal IDs from matching rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableIdFields {
    /// Guid column holding the signal ID
    pub signal_id: String,
    /// String column holding the `SOURCE:123` measurement key
    pub measurement_key: String,
    /// String column holding the point tag
    pub point_tag: String,
}

impl Default for TableIdFields {
    fn default() -> Self {
        Self {
            signal_id: "SignalID".to_string(),
            measurement_key: "ID".to_string(),
            point_tag: "PointTag".to_string(),
        }
    }
}
