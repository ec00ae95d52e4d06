use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use super::query::{QueryParams, QueryValue};

/// Paginated list envelope returned by every admin list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// List endpoint payload. Some collections paginate, others return a bare
/// array; both decode here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    Flat(Vec<T>),
}

impl<T> Listing<T> {
    /// Total matching rows. For a bare array this is its length.
    pub fn count(&self) -> u64 {
        match self {
            Listing::Paged(page) => page.count,
            Listing::Flat(items) => items.len() as u64,
        }
    }

    pub fn results(&self) -> &[T] {
        match self {
            Listing::Paged(page) => &page.results,
            Listing::Flat(items) => items,
        }
    }

    pub fn into_results(self) -> Vec<T> {
        match self {
            Listing::Paged(page) => page.results,
            Listing::Flat(items) => items,
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(self, Listing::Paged(page) if page.has_next())
    }
}

/// Per-request extras layered on top of the client defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: QueryParams,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.set(key, value);
        self
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_deserializes_without_links() {
        let page: Page<serde_json::Value> =
            serde_json::from_value(json!({"count": 1, "results": [{"id": 1}]}))
                .expect("page");
        assert_eq!(page.count, 1);
        assert!(!page.has_next());
        assert!(page.previous.is_none());
    }

    #[test]
    fn listing_accepts_paged_and_flat_payloads() {
        let paged: Listing<serde_json::Value> = serde_json::from_value(json!({
            "count": 40,
            "next": "http://localhost/api/v1/products/?page=2",
            "results": [{"id": 1}]
        }))
        .expect("paged");
        assert!(matches!(paged, Listing::Paged(_)));
        assert_eq!(paged.count(), 40);
        assert!(paged.has_next());

        let flat: Listing<serde_json::Value> =
            serde_json::from_value(json!([{"id": 1}, {"id": 2}])).expect("flat");
        assert!(matches!(flat, Listing::Flat(_)));
        assert_eq!(flat.count(), 2);
        assert!(!flat.has_next());
        assert_eq!(flat.into_results().len(), 2);
    }

    #[test]
    fn request_options_collect_query_and_headers() {
        let options = RequestOptions::new()
            .query("page", 2)
            .header(
                HeaderName::from_static("x-admin-locale"),
                HeaderValue::from_static("ar"),
            );
        assert_eq!(options.query.pairs().collect::<Vec<_>>(), vec![("page", "2")]);
        assert_eq!(options.headers["x-admin-locale"], "ar");
    }
}
