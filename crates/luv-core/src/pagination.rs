//! Page-based pagination for list endpoints.
//!
//! List endpoints accept `page` (1-indexed, default 1) and `limit`
//! (clamped to 1..=100, default 10) and answer with a [`PaginationMeta`]
//! block next to the data:
//!
//! ```json
//! {
//!   "data": [...],
//!   "meta": {
//!     "current_page": 2,
//!     "total_pages": 5,
//!     "total_count": 42,
//!     "limit": 10,
//!     "has_next": true,
//!     "has_prev": true
//!   }
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Deserializes an optional string into an optional i64.
///
/// Query parameters arrive as strings, and an empty value (`?page=`) is
/// treated as absent.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub current_page: i64,
    /// Number of pages needed to show every matching item
    pub total_pages: i64,
    /// Total number of matching items across all pages
    pub total_count: i64,
    /// Items per page (the limit that was applied)
    pub limit: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    #[must_use]
    pub fn new(page: i64, limit: i64, total_count: i64) -> Self {
        let limit = limit.max(1);
        let total_pages = (total_count + limit - 1) / limit;

        Self {
            current_page: page,
            total_pages,
            total_count,
            limit,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Hash, Deserialize, ToSchema)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            limit: Some(DEFAULT_LIMIT),
        }
    }
}

impl PaginationParams {
    /// Returns the effective limit, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Returns the page number, clamped to a minimum of 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Rows to skip for the current page. Saturates at `i64::MAX` for
    /// absurdly large pages, which simply yields an empty page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    #[must_use]
    pub fn meta(&self, total_count: i64) -> PaginationMeta {
        PaginationMeta::new(self.page(), self.limit(), total_count)
    }
}

/// `%term%` for a case-insensitive `ILIKE` filter, with the LIKE
/// metacharacters in `term` matched literally.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Sort direction for list endpoints. Accepts `ASC`/`DESC` in either case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SortOrder {
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[default]
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}
