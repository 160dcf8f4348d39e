//! Construction and serialization of search-request bodies.
//!
//! A [`SearchQuery`] is built per search call, serialized to the store's
//! JSON body format and discarded. The two query modes are mutually
//! exclusive by construction.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Maximum number of hits returned when the caller does not ask
/// for a specific page size.
pub const DEFAULT_QUERY_SIZE: usize = 10;

/// Offset applied when the caller does not ask for one.
pub const DEFAULT_QUERY_FROM: usize = 0;

const DEFAULT_OPERATOR: &str = "and";

/// A serializable search request: query body, sort keys and
/// offset/size pagination bounds.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    query: QueryKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sort: Vec<SortKey>,
    #[serde(skip_serializing_if = "is_zero")]
    from: usize,
    size: usize,
}

/// The full-text query body. Exactly one mode is active at a time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
enum QueryKind {
    MatchAll {},
    MultiMatch {
        query: String,
        fields: Vec<Field>,
        operator: &'static str,
    },
}

/// Flattened configuration for a multi-match query, so callers do not
/// have to reproduce the nested body structure.
#[derive(Debug, Clone, Default)]
pub struct SearchQueryConfig {
    pub fields: Vec<Field>,
    pub sort: Vec<SortKey>,
    pub size: usize,
    pub from: usize,
}

impl SearchQuery {
    /// Returns a query matching every document in the index, with the
    /// default document-order sort so pagination stays reproducible.
    pub fn match_all(size: usize, from: usize) -> Self {
        SearchQuery {
            query: QueryKind::MatchAll {},
            sort: default_sort(),
            from,
            size: normalize_size(size),
        }
    }

    /// Returns a full-text query over the configured weighted fields.
    /// Terms are combined with the `and` operator: all of them must match.
    pub fn multi_match(text: impl Into<String>, cfg: SearchQueryConfig) -> Self {
        let sort = if cfg.sort.is_empty() {
            default_sort()
        } else {
            cfg.sort
        };

        SearchQuery {
            query: QueryKind::MultiMatch {
                query: text.into(),
                fields: cfg.fields,
                operator: DEFAULT_OPERATOR,
            },
            sort,
            from: cfg.from,
            size: normalize_size(cfg.size),
        }
    }

    /// Serializes the query to the store's JSON body format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn normalize_size(size: usize) -> usize {
    if size == 0 {
        DEFAULT_QUERY_SIZE
    } else {
        size
    }
}

// `_doc` is the index-internal document order, the cheapest stable
// tie-break the store offers.
fn default_sort() -> Vec<SortKey> {
    vec![SortKey::asc("_doc")]
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

/// A field name with an optional weight. It serializes to the store's
/// caret syntax: `Field::weighted("title", 10)` renders as `"title^10"`,
/// while a zero weight renders the bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub weight: u32,
}

impl Field {
    pub fn weighted(name: impl Into<String>, weight: u32) -> Self {
        Field {
            name: name.into(),
            weight,
        }
    }

    /// An unweighted field. Equivalent to a weight of zero.
    pub fn plain(name: impl Into<String>) -> Self {
        Field::weighted(name, 0)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weight == 0 {
            f.write_str(&self.name)
        } else {
            write!(f, "{}^{}", self.name, self.weight)
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A sort criterion. Keys serialize in declaration order as single-entry
/// objects, e.g. `{"_score":"desc"}`; the sequence order defines the
/// tie-break precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.order)?;
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}
