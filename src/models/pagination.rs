use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: i64 = 100;

/// Highest page whose offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// A normalized, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Missing or non-positive values fall back to page 1 / `default_size`;
    /// the size is capped at [`MAX_PAGE_SIZE`] and the page at [`MAX_PAGE`].
    pub fn new(page: Option<i64>, page_size: Option<i64>, default_size: i64) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1).min(MAX_PAGE),
            page_size: page_size
                .filter(|s| *s > 0)
                .unwrap_or(default_size)
                .min(MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub page_count: i64,
    pub total: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let page_count = if request.page_size > 0 {
            (total + request.page_size - 1) / request.page_size
        } else {
            0
        };

        Self {
            page: request.page,
            page_size: request.page_size,
            page_count,
            total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            data,
            meta: PageMeta {
                pagination: Pagination::new(request, total),
            },
        }
    }
}

/// `{ "data": ... }` envelope for non-paginated responses.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// `?page=&pageSize=&locale=&status=` for GET list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub locale: Option<String>,
    #[serde(default)]
    pub status: crate::models::PublicationStatus,
}
