//! Cursor-based pagination for list endpoints.
//!
//! Cursors are opaque to clients: a base64-encoded decimal offset into the
//! ordered result set. An unreadable cursor restarts from the first page.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Serialize;

/// Default page size when `count` is not specified.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, Default)]
pub struct PaginationParams {
    pub cursor: Option<String>,
    pub count: Option<u32>,
}

impl PaginationParams {
    /// Effective page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn effective_count(&self) -> u32 {
        self.count
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn decode_offset(&self) -> u64 {
        self.cursor
            .as_deref()
            .and_then(decode_cursor)
            .unwrap_or(0)
    }

    /// Cut one page out of `items` and compute the cursor for the next.
    pub fn page<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let offset = self.decode_offset();
        let count = self.effective_count();
        let total = items.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(total);
        let page: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(count as usize)
            .collect();
        let cursor = if start + page.len() < total {
            Some(encode_cursor((start + page.len()) as u64))
        } else {
            None
        };
        (page, PaginationMeta { cursor })
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    /// Cursor to pass for the next page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

pub fn encode_cursor(offset: u64) -> String {
    URL_SAFE_NO_PAD.encode(offset.to_string())
}

pub fn decode_cursor(cursor: &str) -> Option<u64> {
    let bytes = URL_SAFE_NO_PAD.decode(cursor).ok()?;
    std::str::from_utf8(&bytes).ok()?.parse::<u64>().ok()
}
