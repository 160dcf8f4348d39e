use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::StoreError;
use crate::response::FromHit;

/// A book document as indexed and returned by the API.
///
/// The id is absent until the store assigns one; it is never read back
/// from the document body (see the `FromHit` implementation).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Book {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub author: Author,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub firstname: String,
    pub lastname: String,
}

impl Book {
    /// Checks the fields required for indexing. Validation happens at the
    /// API edge, before the book reaches the repository.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.trim().is_empty() {
            return Err(StoreError::BadRequest("book title is required".to_string()));
        }
        if self.summary.trim().is_empty() {
            return Err(StoreError::BadRequest(
                "book abstract is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl FromHit for Book {
    fn from_hit(id: &str, source: &RawValue) -> Result<Self, StoreError> {
        let mut book: Book = serde_json::from_str(source.get())?;
        // The enclosing envelope's id is authoritative; a freshly created
        // document's source usually omits it.
        book.id = Some(id.to_string());
        Ok(book)
    }
}

/// A partial book used for updates. Absent fields are left untouched
/// by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub author: Option<Author>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book {
            id: None,
            created_at: Utc::now(),
            title: "The Left Hand of Darkness".to_string(),
            summary: "An envoy visits a planet whose inhabitants have no fixed sex.".to_string(),
            author: Author {
                firstname: "Ursula".to_string(),
                lastname: "Le Guin".to_string(),
            },
        }
    }

    #[test]
    fn complete_book_is_valid() {
        assert!(sample_book().validate().is_ok());
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut book = sample_book();
        book.title = "  ".to_string();
        assert!(matches!(
            book.validate(),
            Err(StoreError::BadRequest(_))
        ));
    }

    #[test]
    fn summary_serializes_under_abstract_key() {
        let raw = serde_json::to_value(sample_book()).unwrap();
        assert!(raw.get("abstract").is_some());
        assert!(raw.get("summary").is_none());
        assert!(raw.get("id").is_none());
    }

    #[test]
    fn patch_omits_absent_fields() {
        let patch = BookPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let raw = serde_json::to_string(&patch).unwrap();
        assert_eq!(raw, r#"{"title":"Renamed"}"#);
    }
}
