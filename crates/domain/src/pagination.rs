use mailtrail_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Validated positive page size, uniform across one active dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize(usize);

impl PageSize {
    /// Default number of timeline rows per page.
    pub const DEFAULT: Self = Self(15);

    /// Creates a validated page size.
    pub fn new(value: usize) -> AppResult<Self> {
        if value == 0 {
            return Err(AppError::Validation(
                "page size must be a positive integer".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the page size value.
    #[must_use]
    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One computed page window over a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items within the page window; empty only when the collection is empty.
    pub items: Vec<T>,
    /// Effective page after clamping, in `[1, total_pages]`.
    pub page: usize,
    /// Total page count, never below one.
    pub total_pages: usize,
}

/// Returns `max(1, ceil(len / page_size))`; an empty collection still has one
/// page so the renderer can show its explicit empty-state row.
#[must_use]
pub fn total_pages(len: usize, page_size: PageSize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// Computes the page window for `requested_page`, clamped to the valid range
/// before slicing. Out-of-range requests therefore never fail; they land on
/// the nearest valid page.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page_size: PageSize, requested_page: usize) -> Page<T> {
    let total_pages = total_pages(items.len(), page_size);
    let page = requested_page.clamp(1, total_pages);

    let start = (page - 1) * page_size.get();
    let end = (start + page_size.get()).min(items.len());
    let items = if start < items.len() {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items,
        page,
        total_pages,
    }
}
