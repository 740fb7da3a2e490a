//! Offset pagination helpers shared by the list endpoints.

use serde::Serialize;

/// Limit/offset pair derived from 1-based page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub limit: u64,
    pub offset: u64,
}

impl Paging {
    pub fn from_page_size(page: u64, size: u64) -> Self {
        let page = page.max(1);
        Self {
            limit: size,
            offset: size * (page - 1),
        }
    }
}

/// Page metadata returned alongside list results.
///
/// Field names follow the wire contract consumed by the frontend.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaginationInfo {
    pub size: u64,
    #[serde(rename = "totalElements")]
    pub total_elements: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "currentPage")]
    pub current_page: u64,
}

impl PaginationInfo {
    pub fn new(total_elements: u64, size: u64, current_page: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size)
        };

        Self {
            size,
            total_elements,
            total_pages,
            current_page,
        }
    }
}
