//! HTTP routing and handlers for the book API.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use book_search_core::{
    Book, BookPatch, BookRepository, DocumentStore, Pagination, StoreError, DEFAULT_QUERY_FROM,
    DEFAULT_QUERY_SIZE,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use url::Url;

pub fn router<S: DocumentStore + 'static>(repository: BookRepository<S>) -> Router {
    Router::new()
        .route("/books", get(search_books::<S>).post(insert_book::<S>))
        .route(
            "/books/{id}",
            get(get_book::<S>)
                .put(update_book::<S>)
                .delete(delete_book::<S>),
        )
        .with_state(Arc::new(repository))
}

/// An error rendered as `{"error":{"message":...,"code":...}}`, the code
/// mirroring the HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        let status = match &error {
            StoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: error.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": ErrorBody {
                message: self.message,
                code: self.status.as_u16(),
            }
        });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    query: Option<String>,
    size: Option<String>,
    from: Option<String>,
}

impl SearchParams {
    /// Resolves the pagination window. Absent or unparsable values fall
    /// back to the defaults; explicitly negative values are rejected so
    /// client bugs are not silently masked.
    fn window(&self) -> Result<(usize, usize), ApiError> {
        let size = parse_bound(self.size.as_deref(), "size", DEFAULT_QUERY_SIZE)?;
        let from = parse_bound(self.from.as_deref(), "from", DEFAULT_QUERY_FROM)?;
        let size = if size == 0 { DEFAULT_QUERY_SIZE } else { size };
        Ok((size, from))
    }
}

fn parse_bound(raw: Option<&str>, name: &str, default: usize) -> Result<usize, ApiError> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(value) if value < 0 => Err(ApiError::bad_request(format!(
                "{name} must not be negative"
            ))),
            Ok(value) => Ok(value as usize),
            Err(_) => Ok(default),
        },
    }
}

#[derive(Serialize)]
struct SearchBody {
    results: Vec<Book>,
    total: u64,
    pagination: Pagination,
}

/// Reconstructs the absolute request URL for pagination links.
/// The scheme is fixed to http; TLS termination happens upstream.
fn request_url(headers: &HeaderMap, uri: &Uri) -> Option<Url> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let path_and_query = uri
        .path_and_query()
        .map(|value| value.as_str())
        .unwrap_or("/");
    Url::parse(&format!("http://{host}{path_and_query}")).ok()
}

async fn search_books<S: DocumentStore>(
    State(repository): State<Arc<BookRepository<S>>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchBody>, ApiError> {
    let (size, from) = params.window()?;
    let query = params.query.as_deref().unwrap_or("");

    let page = repository.search(query, size, from).await?;

    let mut pagination = Pagination::new(size, from)?;
    if let Some(url) = request_url(&headers, &uri) {
        pagination.set_links(&url, page.total);
    }

    Ok(Json(SearchBody {
        results: page.hits,
        total: page.total,
        pagination,
    }))
}

async fn get_book<S: DocumentStore>(
    State(repository): State<Arc<BookRepository<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let book = repository.get(&id).await?;
    Ok(Json(book))
}

async fn insert_book<S: DocumentStore>(
    State(repository): State<Arc<BookRepository<S>>>,
    payload: Result<Json<Book>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let Json(mut book) = payload?;
    book.validate()?;

    // The store assigns the id; the server stamps the creation time.
    book.id = None;
    book.created_at = Utc::now();

    let id = repository.insert(&book).await?;
    book.id = Some(id);

    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book<S: DocumentStore>(
    State(repository): State<Arc<BookRepository<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(patch) = payload?;
    repository.update(&id, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_book<S: DocumentStore>(
    State(repository): State<Arc<BookRepository<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    repository.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
