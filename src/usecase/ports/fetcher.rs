use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::query::ListParams;

/// Anything that can go wrong while loading a page. The list core shows
/// every variant the same way; the split only helps the logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Raw page as the backend sends it. Pagination metadata may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse<R> {
    pub content: Vec<R>,
    pub page_no: Option<u32>,
    pub page_size: Option<u32>,
    pub total_elements: Option<u64>,
}

impl<R> PageResponse<R> {
    pub fn new(content: Vec<R>, page_no: u32, page_size: u32, total_elements: u64) -> Self {
        Self {
            content,
            page_no: Some(page_no),
            page_size: Some(page_size),
            total_elements: Some(total_elements),
        }
    }
}

/// Loads one page of rows. Implementations are already scoped to an
/// initiative and point of sale and handle authentication themselves.
#[async_trait]
pub trait ListFetcher<R: Send + 'static>: Send + Sync {
    async fn fetch(&self, params: ListParams) -> Result<PageResponse<R>, FetchError>;
}
