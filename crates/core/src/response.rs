//! Decoding of store response envelopes into typed results.
//!
//! The envelope shapes are independent of the entity being searched;
//! the entity-specific part is delegated to the [`FromHit`] capability,
//! implemented once per document type.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::StoreError;

/// Conversion from a raw hit to a typed entity.
///
/// `id` is the identifier carried by the response envelope and is
/// authoritative; an id embedded in the source document must be ignored.
/// Malformed source bytes are a hard error, never silently defaulted.
pub trait FromHit: Sized {
    fn from_hit(id: &str, source: &RawValue) -> Result<Self, StoreError>;
}

/// A decoded page of search results: the reported total across the whole
/// index plus the typed hits for the requested window, in engine order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage<D> {
    pub total: u64,
    pub hits: Vec<D>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    hits: HitsEnvelope,
}

#[derive(Debug, Default, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    total: TotalHits,
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Default, Deserialize)]
struct TotalHits {
    #[serde(default)]
    value: u64,
}

/// One matched document prior to entity-specific decoding. Lives only
/// inside this module; callers see typed entities.
#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: Box<RawValue>,
    #[allow(dead_code)]
    #[serde(rename = "_score", default)]
    score: Option<f64>,
}

/// Decodes a search response body into a [`SearchPage`].
///
/// Zero matches is a legitimate outcome and decodes to an empty hit list
/// with the reported total. The first hit the unmarshaler rejects aborts
/// the whole decode; partial results are discarded.
pub fn decode_search_response<D: FromHit>(raw: &[u8]) -> Result<SearchPage<D>, StoreError> {
    let envelope: SearchEnvelope = serde_json::from_slice(raw)?;

    let mut hits = Vec::with_capacity(envelope.hits.hits.len());
    for hit in &envelope.hits.hits {
        hits.push(D::from_hit(&hit.id, &hit.source)?);
    }

    Ok(SearchPage {
        total: envelope.hits.total.value,
        hits,
    })
}

#[derive(Debug, Deserialize)]
struct GetEnvelope {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(rename = "_source", default)]
    source: Option<Box<RawValue>>,
}

/// Decodes a single-document get response.
///
/// `found == false` yields `Ok(None)`: at this layer an absent document
/// is a valid outcome, not an error. Translating it into a caller-visible
/// not-found condition is the repository's job.
pub fn decode_get_response<D: FromHit>(raw: &[u8]) -> Result<Option<D>, StoreError> {
    let envelope: GetEnvelope = serde_json::from_slice(raw)?;
    if !envelope.found {
        return Ok(None);
    }

    let source = envelope
        .source
        .ok_or_else(|| StoreError::Malformed("get response without _source".to_string()))?;

    Ok(Some(D::from_hit(&envelope.id, &source)?))
}

#[derive(Debug, Deserialize)]
struct InsertEnvelope {
    #[serde(default)]
    result: String,
    #[serde(rename = "_id", default)]
    id: String,
}

/// Decodes an insert response and returns the store-assigned document id.
///
/// The store can answer HTTP 200 with a semantically unsuccessful body,
/// so only an explicit `"created"` result succeeds.
pub fn decode_insert_response(raw: &[u8]) -> Result<String, StoreError> {
    let envelope: InsertEnvelope = serde_json::from_slice(raw)?;
    if envelope.result != "created" {
        return Err(StoreError::NotCreated(envelope.result));
    }
    Ok(envelope.id)
}

/// Maps a store HTTP status code to an error. Unmapped codes fall back
/// to [`StoreError::Unhandled`]; unknown statuses never panic.
pub fn status_error(status: u16) -> StoreError {
    match status {
        400 => StoreError::BadRequest("store rejected the request".to_string()),
        404 => StoreError::NotFound,
        _ => StoreError::Unhandled(format!("store answered with status {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;

    #[test]
    fn search_response_decodes_typed_hits() {
        let raw = br#"{
            "took": 3,
            "hits": {
                "total": {"value": 2, "relation": "eq"},
                "hits": [
                    {
                        "_id": "a1",
                        "_score": 1.8,
                        "_source": {
                            "created_at": "2021-06-01T10:00:00Z",
                            "title": "Foo",
                            "abstract": "Lorem ipsum foo",
                            "author": {"firstname": "F", "lastname": "Oo"}
                        }
                    },
                    {
                        "_id": "b2",
                        "_source": {
                            "created_at": "2021-06-02T10:00:00Z",
                            "title": "Bar",
                            "abstract": "Lorem ipsum bar",
                            "author": {"firstname": "B", "lastname": "Ar"}
                        }
                    }
                ]
            }
        }"#;

        let page = decode_search_response::<Book>(raw).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.hits.len(), 2);
        assert_eq!(page.hits[0].id.as_deref(), Some("a1"));
        assert_eq!(page.hits[0].title, "Foo");
        assert_eq!(page.hits[1].id.as_deref(), Some("b2"));
    }

    #[test]
    fn envelope_id_wins_over_source_id() {
        let raw = br#"{
            "hits": {
                "total": {"value": 1},
                "hits": [
                    {
                        "_id": "envelope-id",
                        "_source": {
                            "id": "source-id",
                            "created_at": "2021-06-01T10:00:00Z",
                            "title": "Foo",
                            "abstract": "Lorem",
                            "author": {"firstname": "F", "lastname": "Oo"}
                        }
                    }
                ]
            }
        }"#;

        let page = decode_search_response::<Book>(raw).unwrap();
        assert_eq!(page.hits[0].id.as_deref(), Some("envelope-id"));
    }

    #[test]
    fn zero_hits_is_an_empty_page_not_an_error() {
        let raw = br#"{"hits": {"total": {"value": 42}, "hits": []}}"#;
        let page = decode_search_response::<Book>(raw).unwrap();
        assert_eq!(page.total, 42);
        assert!(page.hits.is_empty());
    }

    #[test]
    fn malformed_hit_aborts_the_whole_decode() {
        let raw = br#"{
            "hits": {
                "total": {"value": 2},
                "hits": [
                    {
                        "_id": "a1",
                        "_source": {
                            "created_at": "2021-06-01T10:00:00Z",
                            "title": "Foo",
                            "abstract": "Lorem",
                            "author": {"firstname": "F", "lastname": "Oo"}
                        }
                    },
                    {"_id": "b2", "_source": {"title": 7}}
                ]
            }
        }"#;

        assert!(matches!(
            decode_search_response::<Book>(raw),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn get_response_found_false_is_none() {
        let raw = br#"{"_id": "42", "found": false}"#;
        let result = decode_get_response::<Book>(raw).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn get_response_found_true_yields_entity() {
        let raw = br#"{
            "_id": "42",
            "found": true,
            "_source": {
                "created_at": "2021-06-01T10:00:00Z",
                "title": "Foo",
                "abstract": "Lorem",
                "author": {"firstname": "F", "lastname": "Oo"}
            }
        }"#;

        let book = decode_get_response::<Book>(raw).unwrap().unwrap();
        assert_eq!(book.id.as_deref(), Some("42"));
        assert_eq!(book.title, "Foo");
    }

    #[test]
    fn insert_response_returns_assigned_id() {
        let raw = br#"{"_id": "fresh-id", "result": "created"}"#;
        assert_eq!(decode_insert_response(raw).unwrap(), "fresh-id");
    }

    #[test]
    fn insert_response_without_created_result_fails() {
        let raw = br#"{"_id": "fresh-id", "result": "updated"}"#;
        assert!(matches!(
            decode_insert_response(raw),
            Err(StoreError::NotCreated(result)) if result == "updated"
        ));
    }

    #[test]
    fn status_codes_map_to_the_error_taxonomy() {
        assert!(matches!(status_error(400), StoreError::BadRequest(_)));
        assert!(matches!(status_error(404), StoreError::NotFound));
        assert!(matches!(status_error(500), StoreError::Unhandled(_)));
        assert!(matches!(status_error(418), StoreError::Unhandled(_)));
    }
}
