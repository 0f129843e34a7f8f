//! Availability resolution: the earliest occurrence with open capacity.

use chrono::{DateTime, Utc};

use tourdesk_types::{ResolvedNextTour, Tour};

/// Scan the whole catalog for the earliest occurrence that still has seats.
///
/// Occurrence lists are not assumed sorted. Zero-seat occurrences never
/// become the candidate, even when they are the earliest date on record.
/// Identical date-times keep the first candidate encountered in catalog
/// order. A tour without occurrences contributes nothing; the scan still
/// visits every other tour.
#[must_use]
pub fn find_next_available(catalog: &[Tour]) -> Option<ResolvedNextTour> {
    let mut earliest: Option<ResolvedNextTour> = None;

    for tour in catalog {
        for occurrence in &tour.occurrences {
            if occurrence.seats == 0 {
                continue;
            }
            let replaces = earliest
                .as_ref()
                .is_none_or(|candidate| occurrence.date < candidate.date);
            if replaces {
                earliest = Some(ResolvedNextTour {
                    id: tour.id.clone(),
                    title: tour.title.clone(),
                    location: tour.location.clone(),
                    date: occurrence.date,
                    price: tour.price,
                    seats: occurrence.seats,
                    size: tour.size,
                });
            }
        }
    }

    earliest
}

/// Whether the resolved occurrence falls on the current calendar date,
/// compared in the occurrence's own offset.
///
/// Only the date component matters here; time-of-day phrasing belongs to
/// the response composer.
#[must_use]
pub fn is_same_day(tour: &ResolvedNextTour, now: DateTime<Utc>) -> bool {
    now.with_timezone(&tour.date.timezone()).date_naive() == tour.date.date_naive()
}
