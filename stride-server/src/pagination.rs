use stride_types::Pagination;

use crate::error::{CoreError, CoreResult};

/// A validated (page, limit) pair. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> CoreResult<Self> {
        if page < 1 {
            return Err(CoreError::input(format!("page must be at least 1 (got {page})")));
        }
        if limit < 1 {
            return Err(CoreError::input(format!("limit must be at least 1 (got {limit})")));
        }
        Ok(Self {
            page: page as u64,
            limit: limit as u64,
        })
    }

    /// First row of this page in the full ordered list
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn paginate(&self, total: u64) -> Pagination {
        paginate(total, self.page, self.limit)
    }
}

/// Page metadata for `total` rows split into pages of `limit`.
///
/// `total_pages` is never zero so an empty listing still reads as page 1 of 1.
/// A page past the end is not an error; its window is simply empty.
pub fn paginate(total: u64, page: u64, limit: u64) -> Pagination {
    let page = page.max(1);
    let limit = limit.max(1);
    Pagination {
        page,
        limit,
        total,
        total_pages: total.div_ceil(limit).max(1),
        offset: (page - 1).saturating_mul(limit),
    }
}

/// The slice of an already ordered list that falls on `pagination`'s page
pub fn window<T>(items: Vec<T>, pagination: &Pagination) -> Vec<T> {
    let offset = usize::try_from(pagination.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}
