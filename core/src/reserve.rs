//! Reservation commits: per-locale read-modify-write with a version
//! precondition.

use chrono::{DateTime, FixedOffset};

use tourdesk_client::{ClientError, ContentGateway, TourFields};
use tourdesk_types::{Locale, Reservation, TourId};

/// Decrement the seat count of one occurrence across every locale
/// representation of its tour.
///
/// Locales are written strictly sequentially so that a failure partway
/// through leaves a deterministic prefix committed and the rest untouched;
/// there is no rollback. Each locale is re-read fresh (the write format
/// carries the full record plus its version) and the write uses that version
/// as a precondition, so a concurrent reservation surfaces as
/// [`Reservation::Conflict`] instead of silently overselling.
pub async fn reserve_occurrence<G: ContentGateway>(
    gateway: &G,
    locales: &[Locale],
    id: &TourId,
    date: DateTime<FixedOffset>,
) -> Reservation {
    let mut title = String::new();

    for (index, &locale) in locales.iter().enumerate() {
        let node = match gateway.read_node(id, locale).await {
            Ok(node) => node,
            Err(ClientError::NotFound) if index == 0 => return Reservation::NotFound,
            Err(e) => {
                tracing::error!(tour = %id, locale = %locale, error = %e, "locale read failed, aborting reservation");
                return Reservation::Failed;
            }
        };

        if index == 0 {
            // Gate on the first locale's current state before any write.
            match seats_at(&node.fields, date) {
                None => return Reservation::NotFound,
                Some(0) => {
                    return Reservation::OutOfStock {
                        title: node.fields.title.clone(),
                    };
                }
                Some(_) => {}
            }
            title = node.fields.title.clone();
        }

        let mut update = node.into_update();
        if !decrement_seats(&mut update.fields, date) {
            tracing::error!(
                tour = %id,
                locale = %locale,
                "locale representation is missing the occurrence, aborting reservation"
            );
            return Reservation::Failed;
        }

        match gateway.write_node(id, locale, update).await {
            Ok(()) => {
                tracing::debug!(tour = %id, locale = %locale, "seat count written");
            }
            Err(ClientError::VersionConflict) => {
                tracing::info!(tour = %id, locale = %locale, "concurrent update beat this reservation");
                return Reservation::Conflict;
            }
            Err(e) => {
                tracing::error!(tour = %id, locale = %locale, error = %e, "locale write failed, aborting reservation");
                return Reservation::Failed;
            }
        }
    }

    Reservation::Reserved { title }
}

/// Remaining seats of the occurrence matching `date` exactly, if any.
fn seats_at(fields: &TourFields, date: DateTime<FixedOffset>) -> Option<u32> {
    fields
        .dates
        .iter()
        .find(|entry| matches_instant(&entry.fields.date, date))
        .map(|entry| entry.fields.seats)
}

/// Decrement the matching occurrence in place. Returns false when no entry
/// matches the instant.
fn decrement_seats(fields: &mut TourFields, date: DateTime<FixedOffset>) -> bool {
    for entry in &mut fields.dates {
        if matches_instant(&entry.fields.date, date) {
            entry.fields.seats = entry.fields.seats.saturating_sub(1);
            return true;
        }
    }
    false
}

/// Instant equality, offset-insensitive: `09:00+02:00` matches `07:00Z`.
fn matches_instant(raw: &str, date: DateTime<FixedOffset>) -> bool {
    DateTime::parse_from_rfc3339(raw).is_ok_and(|parsed| parsed == date)
}
