//! Static query templates for the remote store.
//!
//! The GraphQL catalog document and the search query document are embedded
//! in the binary and validated once at client construction. A malformed
//! template surfaces as a [`TemplateError`] from the constructor instead of
//! aborting the process, so the owning startup sequence can decide what to
//! do about it.

use serde_json::Value;
use thiserror::Error;

const CATALOG_QUERY: &str = include_str!("../queries/tours.gql");
const SEARCH_TEMPLATE: &str = include_str!("../queries/search_tour.json");

/// Path inside the search template where the title needle is injected.
const TITLE_MATCH_POINTER: &str = "/query/bool/must/1/match/fields.title";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("search query template is not valid JSON: {0}")]
    SearchJson(#[from] serde_json::Error),
    #[error("search query template has no title match clause at {TITLE_MATCH_POINTER}")]
    SearchShape,
}

/// Validated query templates, loaded once per client.
#[derive(Debug, Clone)]
pub struct QueryTemplates {
    catalog: &'static str,
    search: Value,
}

impl QueryTemplates {
    pub fn load() -> Result<Self, TemplateError> {
        let search: Value = serde_json::from_str(SEARCH_TEMPLATE)?;
        if search.pointer(TITLE_MATCH_POINTER).is_none() {
            return Err(TemplateError::SearchShape);
        }
        Ok(Self {
            catalog: CATALOG_QUERY,
            search,
        })
    }

    #[must_use]
    pub fn catalog_query(&self) -> &'static str {
        self.catalog
    }

    /// Build a search document matching tours whose title resembles `needle`.
    ///
    /// The needle is lower-cased before injection; relevance ranking is
    /// entirely the store's business.
    #[must_use]
    pub fn search_document(&self, needle: &str) -> Value {
        let mut doc = self.search.clone();
        if let Some(slot) = doc.pointer_mut(TITLE_MATCH_POINTER) {
            *slot = Value::String(needle.to_lowercase());
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_templates_load() {
        let templates = QueryTemplates::load().unwrap();
        assert!(templates.catalog_query().contains("elements"));
    }

    #[test]
    fn search_document_injects_lowercased_needle() {
        let templates = QueryTemplates::load().unwrap();
        let doc = templates.search_document("Glassblowing Demo");
        let injected = doc.pointer(TITLE_MATCH_POINTER).unwrap();
        assert_eq!(injected, "glassblowing demo");
    }

    #[test]
    fn search_document_does_not_mutate_template() {
        let templates = QueryTemplates::load().unwrap();
        let _ = templates.search_document("first");
        let doc = templates.search_document("second");
        assert_eq!(
            doc.pointer(TITLE_MATCH_POINTER).unwrap(),
            "second"
        );
    }
}
