//! Typed responses from the ServiceNow table API

use serde::{Deserialize, Serialize};

/// The fields of a created table record the submitter cares about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    /// Human-facing record number (e.g. `DSR0012345`)
    #[serde(default)]
    pub number: String,
    /// Record sys_id, used to build the deep link
    #[serde(default)]
    pub sys_id: String,
}

/// Envelope the table API wraps a created record in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInsertResponse {
    /// The created record
    pub result: TableRecord,
}

/// Outcome of a successful feedback submission
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReceipt {
    /// Record number of the created feedback entry
    pub number: String,
    /// sys_id of the created feedback entry
    pub sys_id: String,
    /// Deep link to the record in the classic UI
    pub link: String,
}
