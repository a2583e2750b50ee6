use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            page_size: Some(20),
        }
    }
}

impl PaginationParams {
    /// Effective page, clamped to 1 so `page=0` cannot produce a negative
    /// offset.
    pub fn get_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to 1 to keep the page math divide-safe.
    pub fn get_page_size(&self) -> i64 {
        self.page_size.unwrap_or(20).max(1)
    }

    pub fn get_offset(&self) -> i64 {
        (self.get_page() - 1) * self.get_page_size()
    }

    pub fn get_limit(&self) -> i64 {
        self.get_page_size()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total_pages = (total + page_size - 1) / page_size;
        Self {
            data,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_page_size_is_clamped_not_divided_by() {
        let params = PaginationParams {
            page: Some(1),
            page_size: Some(0),
        };
        assert_eq!(params.get_limit(), 1);
        assert_eq!(params.get_offset(), 0);

        let response = PaginatedResponse::new(Vec::<i64>::new(), 1, 0, 5);
        assert_eq!(response.page_size, 1);
        assert_eq!(response.total_pages, 5);
    }

    #[test]
    fn test_zero_or_negative_page_yields_first_page_offset() {
        let params = PaginationParams {
            page: Some(0),
            page_size: Some(20),
        };
        assert_eq!(params.get_offset(), 0);

        let params = PaginationParams {
            page: Some(-3),
            page_size: Some(20),
        };
        assert_eq!(params.get_offset(), 0);
    }

    #[test]
    fn test_defaults_and_normal_paging() {
        let params = PaginationParams::default();
        assert_eq!(params.get_limit(), 20);
        assert_eq!(params.get_offset(), 0);

        let params = PaginationParams {
            page: Some(3),
            page_size: Some(10),
        };
        assert_eq!(params.get_offset(), 20);

        let response = PaginatedResponse::new(vec![1, 2, 3], 1, 10, 23);
        assert_eq!(response.total_pages, 3);
    }
}
