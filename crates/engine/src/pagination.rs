//! Offset pagination over a pinned creation-time window.
//!
//! Every list operation fetches `limit + 1` rows in a strict total order. The
//! extra row only tells whether a next page exists. The window is pinned by an
//! upper bound on `created_at`: once the first page has been served, rows
//! inserted later never shift the offsets of the following pages.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, QueryFilter, QuerySelect};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Page size used when the caller does not choose one.
pub const DEFAULT_PAGE_LIMIT: u64 = 20;
/// Largest page size a caller may ask for.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Reproducible pagination window, handed back to the caller with each page
/// and passed unchanged to fetch the following one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub position: u64,
    pub limit: u64,
    pub max_creation_time: DateTime<Utc>,
}

impl Cursor {
    /// Opaque transport form: URL-safe base64 of the JSON document.
    pub fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("unable to encode cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.trim().as_bytes())
            .map_err(|_| EngineError::InvalidCursor("cursor is not base64".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("malformed cursor".to_string()))
    }
}

/// A page of results and the cursor of the next one, if any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }
}

/// The window requested by a list operation.
///
/// `max_creation_time` is inclusive (`created_at <= max_creation_time`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListFilter {
    pub limit: u64,
    pub offset: u64,
    pub max_creation_time: Option<DateTime<Utc>>,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self::first_page(DEFAULT_PAGE_LIMIT)
    }
}

impl ListFilter {
    /// First page of `limit` rows; the window gets pinned by the response.
    #[must_use]
    pub fn first_page(limit: u64) -> Self {
        Self {
            limit,
            offset: 0,
            max_creation_time: None,
        }
    }

    /// The page a previously returned cursor points at.
    #[must_use]
    pub fn from_cursor(cursor: &Cursor) -> Self {
        Self {
            limit: cursor.limit,
            offset: cursor.position,
            max_creation_time: Some(cursor.max_creation_time),
        }
    }

    /// Same window, pinned at `at` unless it is already pinned.
    #[must_use]
    pub fn pinned_or(self, at: DateTime<Utc>) -> Self {
        Self {
            max_creation_time: Some(self.max_creation_time.unwrap_or(at)),
            ..self
        }
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.limit == 0 {
            return Err(EngineError::InvalidFilter(
                "limit must be > 0".to_string(),
            ));
        }
        if self.limit > MAX_PAGE_LIMIT {
            return Err(EngineError::InvalidFilter(format!(
                "limit must be <= {MAX_PAGE_LIMIT}"
            )));
        }
        Ok(())
    }

    fn fetch_limit(&self) -> u64 {
        self.limit.saturating_add(1)
    }
}

/// Applies the window (pin, offset, `limit + 1`) to a select.
///
/// Ordering is left to the caller: each listing has its own total order.
pub(crate) trait ApplyWindow: QueryFilter + QuerySelect + Sized {
    fn apply_window<C: ColumnTrait>(self, filter: &ListFilter, created_at: C) -> Self;
}

impl<T> ApplyWindow for T
where
    T: QueryFilter + QuerySelect + Sized,
{
    fn apply_window<C: ColumnTrait>(mut self, filter: &ListFilter, created_at: C) -> Self {
        if let Some(max_creation_time) = filter.max_creation_time {
            self = QueryFilter::filter(self, created_at.lte(max_creation_time));
        }
        self.offset(filter.offset).limit(filter.fetch_limit())
    }
}

/// Turns the `limit + 1` rows of a windowed query into a page.
///
/// The next cursor keeps the pin from `filter` when there is one, otherwise it
/// pins the window at the creation time of the first row.
pub(crate) fn paginate<T>(
    mut rows: Vec<T>,
    filter: &ListFilter,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Page<T> {
    let Some(first) = rows.first() else {
        return Page::empty();
    };
    let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);
    if rows.len() <= limit {
        return Page {
            items: rows,
            next_cursor: None,
        };
    }

    let max_creation_time = filter.max_creation_time.unwrap_or_else(|| created_at(first));
    rows.truncate(limit);
    Page {
        items: rows,
        next_cursor: Some(Cursor {
            position: filter.offset.saturating_add(filter.limit),
            limit: filter.limit,
            max_creation_time,
        }),
    }
}
