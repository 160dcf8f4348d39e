//! The book repository: composes query construction, response decoding
//! and the store client into the entity CRUD/search contract.

use crate::client::{BulkReport, DocumentStore};
use crate::error::StoreError;
use crate::models::{Book, BookPatch};
use crate::query::{Field, SearchQuery, SearchQueryConfig, SortKey, DEFAULT_QUERY_SIZE};
use crate::response::{
    decode_get_response, decode_insert_response, decode_search_response, status_error, SearchPage,
};

pub struct BookRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> BookRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Searches books matching the free-text query, scoped to the
    /// `size`/`from` window. An empty query matches every book.
    /// A zero `size` falls back to the default page size.
    pub async fn search(
        &self,
        query: &str,
        size: usize,
        from: usize,
    ) -> Result<SearchPage<Book>, StoreError> {
        let size = if size == 0 { DEFAULT_QUERY_SIZE } else { size };
        let body = build_book_query(query, size, from).to_bytes()?;

        let response = self.store.search(&body).await?;
        if !response.is_success() {
            return Err(status_error(response.status));
        }

        decode_search_response::<Book>(&response.body)
    }

    /// Fetches a book by id. An absent document surfaces as
    /// [`StoreError::NotFound`].
    pub async fn get(&self, id: &str) -> Result<Book, StoreError> {
        let response = self.store.get(id).await?;
        if response.status == 404 {
            return Err(StoreError::NotFound);
        }
        if !response.is_success() {
            return Err(status_error(response.status));
        }

        decode_get_response::<Book>(&response.body)?.ok_or(StoreError::NotFound)
    }

    /// Indexes a new book and returns the store-assigned id.
    pub async fn insert(&self, book: &Book) -> Result<String, StoreError> {
        let payload = serde_json::to_vec(book)?;

        let response = self.store.index(&payload).await?;
        if !response.is_success() {
            return Err(status_error(response.status));
        }

        decode_insert_response(&response.body)
    }

    /// Applies a partial update to the book with the given id.
    pub async fn update(&self, id: &str, patch: &BookPatch) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(patch)?;

        let response = self.store.update(id, &payload).await?;
        if response.status == 404 {
            return Err(StoreError::NotFound);
        }
        if !response.is_success() {
            return Err(status_error(response.status));
        }

        Ok(())
    }

    /// Deletes the book with the given id.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self.store.delete(id).await?;
        if response.status == 404 {
            return Err(StoreError::NotFound);
        }
        if !response.is_success() {
            return Err(status_error(response.status));
        }

        Ok(())
    }

    /// Indexes many books in one bulk request. Individual failures do not
    /// abort the batch; the report carries the aggregate counts.
    pub async fn insert_many(&self, books: &[Book]) -> Result<BulkReport, StoreError> {
        let mut documents = Vec::with_capacity(books.len());
        for book in books {
            documents.push(serde_json::to_vec(book)?);
        }

        self.store.bulk_index(&documents).await
    }
}

/// Builds the search body for the book index: match-all when the query
/// text is empty, otherwise a weighted multi-match over title and
/// abstract, ranked by score with a document-order tie-break.
fn build_book_query(text: &str, size: usize, from: usize) -> SearchQuery {
    if text.is_empty() {
        return SearchQuery::match_all(size, from);
    }

    SearchQuery::multi_match(
        text,
        SearchQueryConfig {
            fields: vec![Field::weighted("title", 10), Field::plain("abstract")],
            sort: vec![SortKey::desc("_score"), SortKey::asc("_doc")],
            size,
            from,
        },
    )
}
