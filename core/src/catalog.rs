//! Tour catalog reading: one expanded query, wire records mapped to domain.

use chrono::DateTime;

use tourdesk_client::{ClientError, ContentGateway, DateEntry, NodeRecord, TourNode};
use tourdesk_types::{Locale, Occurrence, Tour, TourId};

/// Fetch every tour with its nested occurrence list.
///
/// A failed remote call propagates as an error so callers can tell a broken
/// store apart from a genuinely empty catalog; the failure is also logged
/// here since listing callers fold it into a terminal outcome.
pub async fn fetch_catalog<G: ContentGateway>(
    gateway: &G,
    locale: Locale,
) -> Result<Vec<Tour>, ClientError> {
    let nodes = gateway.query_catalog(locale).await.inspect_err(|e| {
        tracing::error!(locale = %locale, error = %e, "catalog fetch failed");
    })?;
    Ok(nodes.into_iter().map(tour_from_node).collect())
}

pub(crate) fn tour_from_node(node: TourNode) -> Tour {
    let occurrences = parse_occurrences(&node.fields.dates, &node.uuid);
    Tour {
        id: TourId::new(node.uuid),
        title: node.fields.title,
        location: node.fields.location,
        size: node.fields.size,
        price: node.fields.price,
        occurrences,
    }
}

pub(crate) fn tour_from_record(record: NodeRecord) -> Tour {
    let occurrences = parse_occurrences(&record.fields.dates, &record.uuid);
    Tour {
        id: TourId::new(record.uuid),
        title: record.fields.title,
        location: record.fields.location,
        size: record.fields.size,
        price: record.fields.price,
        occurrences,
    }
}

/// Parse embedded occurrence entries, keeping store order.
///
/// An unparseable date drops only that entry, never the whole tour.
fn parse_occurrences(dates: &[DateEntry], uuid: &str) -> Vec<Occurrence> {
    dates
        .iter()
        .filter_map(|entry| match DateTime::parse_from_rfc3339(&entry.fields.date) {
            Ok(date) => Some(Occurrence {
                date,
                seats: entry.fields.seats,
            }),
            Err(e) => {
                tracing::warn!(
                    tour = uuid,
                    raw = %entry.fields.date,
                    error = %e,
                    "skipping occurrence with unparseable date"
                );
                None
            }
        })
        .collect()
}
