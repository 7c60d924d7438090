//! Machine-readable output for access reports.
//!
//! One row schema, [`AccessRow`]: one per (resource, user) verdict, fully
//! denormalized. Backend: NDJSON to any `Write` impl.

pub mod json_stream;

use crate::reporter::AccessReport;
use serde::Serialize;

/// One verdict row, append-only.
#[derive(Debug, Clone, Serialize)]
pub struct AccessRow {
    pub resource: String,
    pub required_access_level: i64,
    pub user_name: String,
    pub user_id: i64,
    pub role: String,
    pub access_level: i64,
    pub granted: bool,
}

impl AccessReport {
    /// Flatten the report into sink-ready rows.
    pub fn to_rows(&self) -> Vec<AccessRow> {
        self.entries
            .iter()
            .map(|e| AccessRow {
                resource: self.resource.clone(),
                required_access_level: self.required_access_level,
                user_name: e.user_name.clone(),
                user_id: e.user_id,
                role: e.role.to_string(),
                access_level: e.access_level,
                granted: e.granted,
            })
            .collect()
    }
}
