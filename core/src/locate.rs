//! Tour lookup by free-text name.

use tourdesk_client::ContentGateway;
use tourdesk_types::Tour;

use crate::catalog::tour_from_record;

/// Resolve a free-text tour name to the best-ranked match.
///
/// A blank query returns `None` without touching the store. A failed search
/// is logged and treated as no match, never surfaced as an error. When the
/// store returns several hits, only the first-ranked one is used; this layer
/// applies no ranking of its own.
pub async fn locate<G: ContentGateway>(gateway: &G, name: &str) -> Option<Tour> {
    let needle = name.trim();
    if needle.is_empty() {
        return None;
    }

    match gateway.search_tours(needle).await {
        Ok(hits) => {
            let mut hits = hits.into_iter();
            match hits.next() {
                Some(first) => {
                    tracing::debug!(
                        needle,
                        remaining = hits.len(),
                        "using first ranked search match"
                    );
                    Some(tour_from_record(first))
                }
                None => {
                    tracing::debug!(needle, "no search match");
                    None
                }
            }
        }
        Err(e) => {
            tracing::warn!(needle, error = %e, "tour search failed, treating as no match");
            None
        }
    }
}
