//! Grid response envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PaginationInfo;

/// One grid row: field name to value, in projection order.
pub type Row = Map<String, Value>;

/// JSON envelope returned by the grid endpoint.
///
/// `data` is omitted on failure and `message` is present only on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResponse {
    /// Whether the query succeeded.
    pub success: bool,
    /// Rows of the requested page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Row>>,
    /// Records matching the search filter.
    #[serde(default)]
    pub total_records: u64,
    /// Pages at the effective page size.
    #[serde(default)]
    pub total_pages: u64,
    /// Human-readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GridResponse {
    /// Builds a successful envelope.
    #[must_use]
    pub fn success(rows: Vec<Row>, pagination: &PaginationInfo) -> Self {
        Self {
            success: true,
            data: Some(rows),
            total_records: pagination.total_records,
            total_pages: pagination.total_pages,
            message: None,
        }
    }

    /// Builds a failure envelope.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            total_records: 0,
            total_pages: 0,
            message: Some(message.into()),
        }
    }

    /// Returns the rows, or an empty slice on failure.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        self.data.as_deref().unwrap_or_default()
    }
}
