pub mod client;
pub mod error;
pub mod models;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod response;
pub mod stores;

pub use client::{BulkReport, DocumentStore, StoreResponse};
pub use error::StoreError;
pub use models::{Author, Book, BookPatch};
pub use pagination::{offset_to_page, page_to_offset, Links, Pagination};
pub use query::{
    Field, SearchQuery, SearchQueryConfig, SortKey, SortOrder, DEFAULT_QUERY_FROM,
    DEFAULT_QUERY_SIZE,
};
pub use repository::BookRepository;
pub use response::{
    decode_get_response, decode_insert_response, decode_search_response, status_error, FromHit,
    SearchPage,
};
pub use stores::ElasticsearchStore;
