//! Offset pagination primitives shared by BookHub list endpoints.
//!
//! A [`PageRequest`] is a validated `(page, page_size)` pair. The first page
//! is `0` and the slice it selects starts at `page * page_size`. Requests are
//! validated against [`PageLimits`] so an oversized `page_size` is rejected
//! rather than silently clamped. [`Page`] carries one slice of results
//! together with the total number of matching rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size applied when a caller omits `page_size`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on `page_size` when no explicit limit is configured.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Failures raised while validating pagination input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// `page_size` was zero.
    #[error("page_size must be at least 1")]
    ZeroPageSize,
    /// `page_size` exceeded the configured maximum.
    #[error("page_size {requested} exceeds the maximum of {max}")]
    PageSizeTooLarge {
        /// Requested page size.
        requested: u32,
        /// Configured maximum.
        max: u32,
    },
    /// `page * page_size` does not fit a signed 64-bit offset.
    #[error("page {page} with page_size {page_size} is out of range")]
    OffsetOverflow {
        /// Requested page index.
        page: u32,
        /// Requested page size.
        page_size: u32,
    },
    /// A limit of zero would reject every request.
    #[error("max_page_size must be at least 1")]
    ZeroMaxPageSize,
}

/// Bounds applied to incoming page requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    max_page_size: u32,
}

impl PageLimits {
    /// Build limits with the supplied maximum page size.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroMaxPageSize`] when `max_page_size` is zero.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageLimits;
    ///
    /// let limits = PageLimits::new(50).expect("non-zero limit");
    /// assert_eq!(limits.max_page_size(), 50);
    /// ```
    pub const fn new(max_page_size: u32) -> Result<Self, PaginationError> {
        if max_page_size == 0 {
            return Err(PaginationError::ZeroMaxPageSize);
        }
        Ok(Self { max_page_size })
    }

    /// Largest accepted `page_size`.
    #[must_use]
    pub const fn max_page_size(self) -> u32 {
        self.max_page_size
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Raw pagination query parameters as supplied by a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    /// Zero-based page index. Defaults to `0`.
    pub page: Option<u32>,
    /// Number of items per page. Defaults to [`DEFAULT_PAGE_SIZE`].
    pub page_size: Option<u32>,
}

/// Validated offset pagination request.
///
/// ## Invariants
/// - `page_size` is between 1 and the limit it was validated against.
/// - `offset()` fits in an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate `page` and `page_size` against `limits`.
    ///
    /// # Errors
    ///
    /// Returns a [`PaginationError`] when `page_size` is zero, larger than the
    /// configured maximum, or the resulting offset overflows.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageLimits, PageRequest};
    ///
    /// let request = PageRequest::new(2, 10, PageLimits::default()).expect("valid");
    /// assert_eq!(request.offset(), 20);
    /// ```
    pub fn new(page: u32, page_size: u32, limits: PageLimits) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        if page_size > limits.max_page_size() {
            return Err(PaginationError::PageSizeTooLarge {
                requested: page_size,
                max: limits.max_page_size(),
            });
        }
        let offset = u64::from(page) * u64::from(page_size);
        if i64::try_from(offset).is_err() {
            return Err(PaginationError::OffsetOverflow { page, page_size });
        }
        Ok(Self { page, page_size })
    }

    /// Validate client parameters, filling in defaults for omitted values.
    ///
    /// # Errors
    ///
    /// See [`PageRequest::new`].
    pub fn from_params(params: PageParams, limits: PageLimits) -> Result<Self, PaginationError> {
        Self::new(
            params.page.unwrap_or(0),
            params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            limits,
        )
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Maximum number of items in the page.
    #[must_use]
    pub const fn page_size(self) -> u32 {
        self.page_size
    }

    /// Number of items skipped before this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.page as u64 * self.page_size as u64
    }
}

/// One slice of a paginated collection plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    request: PageRequest,
}

impl<T> Page<T> {
    /// Assemble a page from the fetched slice and the overall total.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Items in this page, in storage order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page and return its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Total number of matching items across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of items in this page.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Request that produced this page.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Transform every item while keeping the page metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}
