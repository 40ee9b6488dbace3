//! Page-number pagination for listing pages.

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page numbers start at 1")]
    ZeroPage,
    #[error("page {page} is past the last page ({last})")]
    OutOfRange { page: usize, last: usize },
}

/// Requested page; 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size: page_size.max(1),
        }
    }

    pub fn first(page_size: usize) -> Self {
        Self::new(1, page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    /// Slice `items` down to the requested page.
    ///
    /// The first page always exists, even when `items` is empty.
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Result<Self, PaginationError> {
        if request.page == 0 {
            return Err(PaginationError::ZeroPage);
        }

        let page_size = request.page_size.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        if request.page > total_pages {
            return Err(PaginationError::OutOfRange {
                page: request.page,
                last: total_pages,
            });
        }

        let items = items
            .into_iter()
            .skip((request.page - 1) * page_size)
            .take(page_size)
            .collect();

        Ok(Self {
            items,
            page: request.page,
            page_size,
            total_items,
            total_pages,
        })
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn next_page(&self) -> Option<usize> {
        self.has_next().then_some(self.page + 1)
    }

    pub fn previous_page(&self) -> Option<usize> {
        self.has_previous().then(|| self.page - 1)
    }
}
