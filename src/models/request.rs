//! Grid request types.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sort direction for the single sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending (default).
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    /// Descending.
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    /// Parses a direction. Anything other than a case-insensitive `DESC`
    /// is ascending.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("DESC") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fetch of one grid page.
///
/// Built fresh for every fetch and never stored by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRequest {
    /// Registered grid identifier.
    pub table_id: String,
    /// Requested page; values below 1 are clamped by pagination.
    pub page: i64,
    /// Free-text search term, possibly empty.
    pub search: String,
    /// Sort field, possibly empty.
    pub sort_field: String,
    /// Sort direction.
    pub sort_dir: SortDirection,
    /// Requested page size; clamped into `[1, 100]` by pagination.
    pub per_page: i64,
}

impl GridRequest {
    /// Creates a first-page, unsorted, unfiltered request.
    #[must_use]
    pub fn new(table_id: impl Into<String>, per_page: i64) -> Self {
        Self {
            table_id: table_id.into(),
            page: 1,
            search: String::new(),
            sort_field: String::new(),
            sort_dir: SortDirection::Asc,
            per_page,
        }
    }

    /// Returns the query-string pairs for `GET {api_url}`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("table", self.table_id.clone()),
            ("page", self.page.to_string()),
            ("search", self.search.clone()),
            ("sort_field", self.sort_field.clone()),
            ("sort_dir", self.sort_dir.as_str().to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Raw query-string parameters as received by the endpoint.
///
/// Every field is optional text so that a malformed value never rejects the
/// whole request; coercion happens in [`GridQueryParams::into_request`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridQueryParams {
    /// Grid identifier.
    pub table: Option<String>,
    /// Page number.
    pub page: Option<String>,
    /// Search term.
    pub search: Option<String>,
    /// Sort field.
    pub sort_field: Option<String>,
    /// Sort direction.
    pub sort_dir: Option<String>,
    /// Page size.
    pub per_page: Option<String>,
}

impl GridQueryParams {
    /// Returns the grid identifier, if one was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `table` is absent or blank.
    pub fn table_id(&self) -> Result<&str> {
        self.table
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidInput("missing 'table' parameter".to_string()))
    }

    /// Coerces the parameters into a [`GridRequest`].
    ///
    /// Unparseable `page` becomes 1 and unparseable `per_page` becomes the
    /// table's default; range clamping is left to pagination.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `table` is absent.
    pub fn into_request(self, default_per_page: i64) -> Result<GridRequest> {
        let table_id = self.table_id()?.to_string();
        Ok(GridRequest {
            table_id,
            page: parse_int(self.page.as_deref()).unwrap_or(1),
            search: self.search.unwrap_or_default(),
            sort_field: self.sort_field.unwrap_or_default(),
            sort_dir: self
                .sort_dir
                .as_deref()
                .map_or(SortDirection::Asc, SortDirection::parse),
            per_page: parse_int(self.per_page.as_deref()).unwrap_or(default_per_page),
        })
    }
}

fn parse_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}
