//! Paginated response envelope returned by list endpoints.

use serde::Deserialize;
use serde::Serialize;

/// Pagination metadata reported by the server.
///
/// Authoritative for the pager: `current_page` and `last_page` bound the
/// pages a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total number of records across all pages.
    pub total: u64,
    /// Records per page as applied by the server.
    pub per_page: u32,
    /// The page this response holds (1-based).
    pub current_page: u32,
    /// The last available page (1-based, at least 1).
    pub last_page: u32,
}

impl PageMeta {
    /// Zeroed metadata: no records, a single empty page.
    pub fn empty(per_page: u32) -> Self {
        Self {
            total: 0,
            per_page,
            current_page: 1,
            last_page: 1,
        }
    }

    /// Returns `true` if a page after `page` exists.
    pub fn has_more_after(&self, page: u32) -> bool {
        page < self.last_page
    }
}

/// A page of rows plus its metadata: `{data, meta}` on the wire.
///
/// Both fields are optional on the wire. A missing `data` is an empty page and
/// a missing `meta` is filled in by the fetcher.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerResponse<T> {
    /// Rows of the requested page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Pagination metadata.
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl<T> ServerResponse<T> {
    /// Creates a response with rows and metadata.
    pub fn new(data: Vec<T>, meta: PageMeta) -> Self {
        Self {
            data,
            meta: Some(meta),
        }
    }

    /// Returns the metadata, or zeroed metadata for `per_page` if the server
    /// omitted it.
    pub fn meta_or_empty(&self, per_page: u32) -> PageMeta {
        self.meta.unwrap_or_else(|| PageMeta::empty(per_page))
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_format() {
        let json = r#"{"data":[{"id":1}],"meta":{"total":21,"perPage":10,"currentPage":2,"lastPage":3}}"#;
        let res: ServerResponse<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(res.len(), 1);
        let meta = res.meta_or_empty(10);
        assert_eq!(meta.total, 21);
        assert_eq!(meta.current_page, 2);
        assert!(meta.has_more_after(2));
        assert!(!meta.has_more_after(3));
    }

    #[test]
    fn test_missing_fields_default() {
        let res: ServerResponse<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(res.is_empty());
        assert_eq!(res.meta_or_empty(25), PageMeta::empty(25));
    }
}
