//! Offset/size to page-number translation and navigation links.
//!
//! The store paginates with "skip N, take M" while the API exposes
//! 1-based page numbers. Everything here is computed fresh per request.

use serde::Serialize;
use url::Url;

use crate::error::StoreError;

/// Page metadata derived from offset-based pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub links: Links,
}

/// Navigation links towards the adjacent result pages. A link is absent
/// when the corresponding page does not exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Links {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Returns the 1-based page number holding the given offset.
/// `size` must be positive; division by zero never reaches this point
/// when callers validate their pagination input upstream.
pub fn offset_to_page(from: usize, size: usize) -> Result<usize, StoreError> {
    if size == 0 {
        return Err(StoreError::BadRequest(
            "page size must be positive".to_string(),
        ));
    }
    Ok(from / size + 1)
}

/// Returns the offset of the first hit of the given 1-based page.
pub fn page_to_offset(page: usize, size: usize) -> Result<usize, StoreError> {
    if size == 0 {
        return Err(StoreError::BadRequest(
            "page size must be positive".to_string(),
        ));
    }
    Ok(page.saturating_sub(1) * size)
}

impl Pagination {
    /// Builds the pagination metadata for a request window.
    /// For any `from >= 0` and `size > 0` the resulting page is >= 1.
    pub fn new(size: usize, from: usize) -> Result<Self, StoreError> {
        Ok(Pagination {
            page: offset_to_page(from, size)?,
            per_page: size,
            links: Links::default(),
        })
    }

    /// Sets the prev/next links from the original request URL and the
    /// total number of hits.
    ///
    /// `prev` exists iff the current page is not the first; `next` exists
    /// iff at least one hit lies beyond the current window. Links keep the
    /// request's scheme, host, path and every non-pagination query
    /// parameter; only `from` and `size` are overwritten, and the query
    /// string is re-encoded with its keys sorted so output is stable.
    pub fn set_links(&mut self, request_url: &Url, total: u64) {
        let offset = (self.page - 1) * self.per_page;
        let mut links = Links::default();

        if self.page > 1 {
            links.prev = Some(self.url_at_offset(request_url, offset - self.per_page));
        }
        if total > (self.page * self.per_page) as u64 {
            links.next = Some(self.url_at_offset(request_url, offset + self.per_page));
        }

        self.links = links;
    }

    fn url_at_offset(&self, request_url: &Url, from: usize) -> String {
        let mut pairs: Vec<(String, String)> = request_url
            .query_pairs()
            .filter(|(key, _)| key != "from" && key != "size")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        pairs.push(("from".to_string(), from.to_string()));
        pairs.push(("size".to_string(), self.per_page.to_string()));
        pairs.sort();

        let mut url = request_url.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs.iter().map(|(key, value)| (key.as_str(), value.as_str())));
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_maps_to_one_based_page() {
        assert_eq!(offset_to_page(0, 10).unwrap(), 1);
        assert_eq!(offset_to_page(10, 10).unwrap(), 2);
        assert_eq!(offset_to_page(11, 10).unwrap(), 2);
        assert_eq!(offset_to_page(100, 10).unwrap(), 11);
    }

    #[test]
    fn page_maps_back_to_offset() {
        assert_eq!(page_to_offset(1, 10).unwrap(), 0);
        assert_eq!(page_to_offset(2, 10).unwrap(), 10);
        assert_eq!(page_to_offset(11, 10).unwrap(), 100);
    }

    #[test]
    fn round_trip_stays_within_the_page() {
        for (from, size) in [(0, 10), (7, 3), (10, 10), (11, 10), (99, 25)] {
            let page = offset_to_page(from, size).unwrap();
            let start = page_to_offset(page, size).unwrap();
            let end = page_to_offset(page + 1, size).unwrap();
            assert!(start <= from && from < end, "from={from} size={size}");
        }
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(offset_to_page(10, 0).is_err());
        assert!(page_to_offset(2, 0).is_err());
        assert!(Pagination::new(0, 10).is_err());
    }

    fn links_for(target: &str, size: usize, from: usize, total: u64) -> Links {
        let url = Url::parse(target).unwrap();
        let mut pagination = Pagination::new(size, from).unwrap();
        pagination.set_links(&url, total);
        pagination.links
    }

    #[test]
    fn first_page_has_no_prev_link() {
        let links = links_for("http://localhost:9999/books?query=foo&size=1&from=0", 1, 0, 1000);
        assert_eq!(links.prev, None);
        assert_eq!(
            links.next.as_deref(),
            Some("http://localhost:9999/books?from=1&query=foo&size=1")
        );
    }

    #[test]
    fn middle_page_has_both_links() {
        let links = links_for(
            "http://localhost:9999/books?query=foo&size=10&from=10",
            10,
            10,
            1000,
        );
        assert_eq!(
            links.prev.as_deref(),
            Some("http://localhost:9999/books?from=0&query=foo&size=10")
        );
        assert_eq!(
            links.next.as_deref(),
            Some("http://localhost:9999/books?from=20&query=foo&size=10")
        );
    }

    #[test]
    fn last_page_has_no_next_link() {
        // Page 2 of 10 with 19 hits total: nothing beyond the window.
        let links = links_for("http://localhost:9999/books?size=10&from=10", 10, 10, 19);
        assert_eq!(
            links.prev.as_deref(),
            Some("http://localhost:9999/books?from=0&size=10")
        );
        assert_eq!(links.next, None);
    }

    #[test]
    fn non_pagination_parameters_are_preserved() {
        let links = links_for(
            "http://localhost:9999/books?query=dune&lang=en&size=10&from=10",
            10,
            10,
            1000,
        );
        assert_eq!(
            links.next.as_deref(),
            Some("http://localhost:9999/books?from=20&lang=en&query=dune&size=10")
        );
    }

    #[test]
    fn links_serialize_only_when_present() {
        let mut pagination = Pagination::new(10, 0).unwrap();
        let url = Url::parse("http://localhost:9999/books?size=10&from=0").unwrap();
        pagination.set_links(&url, 3);

        let raw = serde_json::to_string(&pagination).unwrap();
        assert_eq!(raw, r#"{"page":1,"per_page":10,"links":{}}"#);
    }
}
