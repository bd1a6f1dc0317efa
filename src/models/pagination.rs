//! Page arithmetic.

use serde::{Deserialize, Serialize};

/// Smallest page size a caller can obtain.
pub const MIN_PER_PAGE: i64 = 1;

/// Largest page size a caller can obtain, for every table.
pub const MAX_PER_PAGE: i64 = 100;

/// Derived page metadata.
///
/// Always satisfies `offset == (page - 1) * per_page`,
/// `total_pages == ceil(total_records / per_page)`, `page >= 1` and
/// `1 <= per_page <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// Current page, 1-based.
    pub page: u64,
    /// Rows per page after clamping.
    pub per_page: u64,
    /// Number of pages; zero when there are no records.
    pub total_pages: u64,
    /// Number of records matching the filter.
    pub total_records: u64,
    /// Rows skipped before the current page.
    pub offset: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
}

impl PaginationInfo {
    /// Computes page metadata from untrusted `page`/`per_page` values.
    ///
    /// `page` is clamped to at least 1 but never against `total_pages`: a
    /// page past the end is valid and simply selects no rows. `per_page` is
    /// clamped into `[MIN_PER_PAGE, MAX_PER_PAGE]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tablegrid::PaginationInfo;
    ///
    /// let info = PaginationInfo::calculate(23, 3, 10);
    /// assert_eq!(info.total_pages, 3);
    /// assert_eq!(info.offset, 20);
    /// assert!(!info.has_next);
    /// assert!(info.has_prev);
    /// ```
    #[must_use]
    pub fn calculate(total_records: u64, page: i64, per_page: i64) -> Self {
        let page = u64::try_from(page.max(1)).unwrap_or(1);
        let per_page = u64::try_from(per_page.clamp(MIN_PER_PAGE, MAX_PER_PAGE)).unwrap_or(1);
        let total_pages = total_records.div_ceil(per_page);
        let offset = (page - 1).saturating_mul(per_page);

        Self {
            page,
            per_page,
            total_pages,
            total_records,
            offset,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Offset as a signed SQL parameter, saturating at `i64::MAX`.
    #[must_use]
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }

    /// Page size as a signed SQL parameter.
    #[must_use]
    pub fn sql_limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(MAX_PER_PAGE)
    }

    /// First and last record numbers shown on this page (1-based,
    /// inclusive), or `(0, 0)` when the page is empty.
    #[must_use]
    pub fn visible_range(&self) -> (u64, u64) {
        let end = self
            .total_records
            .min(self.page.saturating_mul(self.per_page));
        if self.offset >= end {
            return (0, 0);
        }
        (self.offset + 1, end)
    }
}
