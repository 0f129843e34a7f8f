//! Wire-level records exchanged with the remote content store.
//!
//! These mirror the store's JSON shapes exactly and stay dumb: date strings
//! are kept as strings here and parsed by the core when it maps records into
//! domain types. The node `version` string is the optimistic-concurrency
//! token a write must echo back.

use serde::{Deserialize, Serialize};

/// A tour node as returned by the catalog query (no version, no language).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourNode {
    pub uuid: String,
    pub fields: TourFields,
}

/// A full node record as returned by search and single-node reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub uuid: String,
    pub language: String,
    pub version: String,
    pub fields: TourFields,
}

impl NodeRecord {
    /// Turn this record into an update request carrying the read version as
    /// the write precondition.
    #[must_use]
    pub fn into_update(self) -> NodeUpdateRequest {
        NodeUpdateRequest {
            language: self.language,
            version: self.version,
            fields: self.fields,
        }
    }
}

/// The content fields of a tour node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourFields {
    pub title: String,
    pub location: String,
    pub size: u32,
    pub price: f64,
    #[serde(default)]
    pub dates: Vec<DateEntry>,
}

/// One embedded occurrence entry inside a tour node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateEntry {
    pub fields: DateFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFields {
    /// RFC 3339 date-time with explicit offset.
    pub date: String,
    pub seats: u32,
}

/// Full-record update written back to one locale representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdateRequest {
    pub language: String,
    /// Version read from the store; the write fails with a conflict when the
    /// record has moved on since.
    pub version: String,
    pub fields: TourFields,
}

#[derive(Debug, Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
    pub data: Option<CatalogData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogData {
    pub tours: NodeList,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeList {
    #[serde(default)]
    pub elements: Vec<TourNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub data: Vec<NodeRecord>,
}
