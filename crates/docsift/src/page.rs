//! Pagination.

use serde::Serialize;

use crate::error::{Result, SeekerError};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Page sizes offered by a page-size picker.
pub const PAGE_SIZE_OPTIONS: &[usize] = &[10, 25, 50, 100, 500];

/// Returns page `page` (1-based) of `items`.
///
/// Pages past the end are empty. Page 0 and a page size of 0 are errors.
///
/// ```
/// use docsift::paginate;
///
/// let items = [1, 2, 3, 4, 5];
/// assert_eq!(paginate(&items, 2, 2).unwrap(), &[3, 4]);
/// assert_eq!(paginate(&items, 3, 2).unwrap(), &[5]);
/// assert!(paginate(&items, 100, 10).unwrap().is_empty());
/// ```
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Result<&[T]> {
    if page == 0 {
        return Err(SeekerError::InvalidPage(page));
    }
    if page_size == 0 {
        return Err(SeekerError::InvalidPageSize);
    }
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = page.saturating_mul(page_size).min(items.len());
    Ok(&items[start..end])
}

/// Position of a page within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number.
    pub page: usize,
    /// Items per page.
    pub page_size: usize,
    /// Items across all pages.
    pub total_items: usize,
    /// Number of pages; 0 for an empty collection.
    pub total_pages: usize,
    /// 1-based index of the first item on the page, or 0 when the page is
    /// empty.
    pub start: usize,
    /// 1-based index of the last item on the page, or 0 when the page is
    /// empty.
    pub end: usize,
    /// A page exists before this one.
    pub has_prev: bool,
    /// A page exists after this one.
    pub has_next: bool,
}

impl PageInfo {
    /// Describes page `page` of `total_items` items split into pages of
    /// `page_size`. Page 0 and a page size of 0 are errors.
    pub fn new(page: usize, page_size: usize, total_items: usize) -> Result<Self> {
        if page == 0 {
            return Err(SeekerError::InvalidPage(page));
        }
        if page_size == 0 {
            return Err(SeekerError::InvalidPageSize);
        }
        let total_pages = total_items.div_ceil(page_size);
        let first = (page - 1).saturating_mul(page_size);
        let (start, end) = if first < total_items {
            (first + 1, page.saturating_mul(page_size).min(total_items))
        } else {
            (0, 0)
        };
        Ok(PageInfo {
            page,
            page_size,
            total_items,
            total_pages,
            start,
            end,
            has_prev: page > 1,
            has_next: page < total_pages,
        })
    }

    /// Returns `true` if there is an earlier page.
    pub fn has_prev(&self) -> bool {
        self.has_prev
    }

    /// Returns `true` if there is a later page.
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Returns `true` if the page holds at least one item.
    pub fn contains_items(&self) -> bool {
        self.start > 0
    }
}
