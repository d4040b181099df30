use serde::Serialize;

use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page arithmetic for a result set of `total` rows. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            total,
        }
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self) -> u32 {
        self.total.div_ceil(self.page_size)
    }

    pub fn previous(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    pub fn next(&self) -> Option<u32> {
        (self.page < self.total_pages()).then(|| self.page + 1)
    }

    /// 1-based positions of the first and last row on this page.
    pub fn showing_range(&self) -> (u32, u32) {
        if self.total == 0 {
            return (0, 0);
        }
        let first = self.offset() + 1;
        let last = (self.page.saturating_mul(self.page_size)).min(self.total);
        (first.min(last), last)
    }

    /// Controls are hidden when everything fits on one page.
    pub fn controls_visible(&self) -> bool {
        self.total > self.page_size
    }
}

/// A fully resolved request for one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub page: u32,
    pub page_size: u32,
}

impl SearchQuery {
    pub fn offset(&self) -> u32 {
        Pagination::new(self.page, self.page_size, 0).offset()
    }
}

/// What the user asked the result list to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Run the keyword (or the saved keyword when blank) from page 1.
    Search { keyword: Option<String> },
    Previous,
    Next,
    Goto(u32),
    PageSize(u32),
}

/// Where the committed search currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCursor {
    pub keyword: String,
    pub page: u32,
    pub page_size: u32,
    pub total: u32,
}

impl Default for SearchCursor {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

impl SearchCursor {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size, self.total)
    }

    /// Resolves a navigation into the query to run, or `None` when it is a
    /// no-op (previous on page 1, next on the last page).
    pub fn navigate(
        &self,
        navigation: Navigation,
        saved_keyword: &str,
    ) -> Result<Option<SearchQuery>, AppError> {
        let pagination = self.pagination();
        let query = |page: u32, page_size: u32| SearchQuery {
            keyword: self.keyword.clone(),
            page,
            page_size,
        };

        match navigation {
            Navigation::Search { keyword } => {
                let keyword = keyword
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .unwrap_or_else(|| saved_keyword.to_string());
                Ok(Some(SearchQuery {
                    keyword,
                    page: 1,
                    page_size: self.page_size,
                }))
            }
            Navigation::Previous => Ok(pagination.previous().map(|p| query(p, self.page_size))),
            Navigation::Next => Ok(pagination.next().map(|p| query(p, self.page_size))),
            Navigation::Goto(page) => {
                let last = pagination.total_pages().max(1);
                if page == 0 || page > last {
                    return Err(AppError::Validation(format!(
                        "Page must be between 1 and {last}"
                    )));
                }
                Ok(Some(query(page, self.page_size)))
            }
            Navigation::PageSize(page_size) => {
                if page_size == 0 {
                    return Err(AppError::Validation(
                        "Page size must be greater than zero".to_string(),
                    ));
                }
                Ok(Some(query(1, page_size)))
            }
        }
    }
}
