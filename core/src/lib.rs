//! Booking core for Tourdesk.
//!
//! Four components carry the real logic, everything around them is thin
//! adaptation:
//!
//! - [`catalog`] - fetches every tour with its nested occurrences
//! - [`availability`] - reduces the catalog to the earliest occurrence with
//!   open capacity
//! - [`locate`] - resolves a free-text tour name via the store's search
//! - [`reserve`] - the per-locale decrement-and-write commit
//!
//! [`TourService`] wires them behind the surface an intent layer consumes.
//! Every method converts upstream failures into a terminal outcome value;
//! nothing here propagates a transport error to the caller, and the
//! user-visible phrasing of each outcome belongs to the response composer.

pub mod availability;
pub mod catalog;
pub mod locate;
pub mod reserve;

pub use availability::{find_next_available, is_same_day};
pub use catalog::fetch_catalog;
pub use locate::locate;
pub use reserve::reserve_occurrence;

use chrono::{DateTime, FixedOffset, Utc};

use tourdesk_client::ContentGateway;
use tourdesk_types::{Listing, Locale, NextTour, Price, Reservation, Stock, TourId, TourSummary};

/// The booking operations exposed to the intent layer.
///
/// Holds the remote gateway as an explicit constructed dependency. The
/// catalog is never cached: every operation works on a fresh fetch, and the
/// remote store stays the only authority on seat counts.
#[derive(Debug, Clone)]
pub struct TourService<G> {
    gateway: G,
    locales: Vec<Locale>,
}

impl<G: ContentGateway> TourService<G> {
    /// Service over all store-maintained locales.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            locales: Locale::SUPPORTED.to_vec(),
        }
    }

    /// List the catalog in the given locale, in store order.
    ///
    /// A fetch failure is reported as [`Listing::Unavailable`], distinct
    /// from [`Listing::Empty`], so the composer can phrase them apart.
    pub async fn list_tours(&self, locale: Locale) -> Listing {
        let Ok(catalog) = fetch_catalog(&self.gateway, locale).await else {
            return Listing::Unavailable;
        };
        if catalog.is_empty() {
            return Listing::Empty;
        }
        Listing::Tours(
            catalog
                .into_iter()
                .map(|tour| TourSummary {
                    title: tour.title,
                    size: tour.size,
                })
                .collect(),
        )
    }

    /// Resolve the earliest occurrence with open capacity, plus the same-day
    /// flag the composer's phrasing branches on.
    pub async fn next_available(&self, locale: Locale) -> NextTour {
        let Ok(catalog) = fetch_catalog(&self.gateway, locale).await else {
            return NextTour::Unavailable;
        };
        match find_next_available(&catalog) {
            Some(tour) => {
                let today = is_same_day(&tour, Utc::now());
                NextTour::Found { tour, today }
            }
            None => NextTour::NoneAvailable,
        }
    }

    /// Remaining seats of a tour located by name.
    ///
    /// Reports the first occurrence entry's seat count, matching the store's
    /// listing order.
    pub async fn stock_level(&self, name: &str) -> Stock {
        match locate(&self.gateway, name).await {
            Some(tour) => match tour.occurrences.first() {
                Some(occurrence) => Stock::Available {
                    title: tour.title,
                    seats: occurrence.seats,
                },
                None => Stock::NotFound,
            },
            None => Stock::NotFound,
        }
    }

    /// Price of a tour located by name.
    pub async fn tour_price(&self, name: &str) -> Price {
        match locate(&self.gateway, name).await {
            Some(tour) => Price::Priced {
                title: tour.title,
                price: tour.price,
            },
            None => Price::NotFound,
        }
    }

    /// Reserve one seat on the next available occurrence.
    ///
    /// Resolves against a fresh catalog, then commits the decrement across
    /// every locale representation sequentially.
    pub async fn reserve_next(&self, locale: Locale) -> Reservation {
        let Ok(catalog) = fetch_catalog(&self.gateway, locale).await else {
            return Reservation::Failed;
        };
        let Some(resolved) = find_next_available(&catalog) else {
            return Reservation::NotFound;
        };
        if resolved.seats == 0 {
            return Reservation::OutOfStock {
                title: resolved.title,
            };
        }
        reserve_occurrence(&self.gateway, &self.locales, &resolved.id, resolved.date).await
    }

    /// Reserve one seat on a specific occurrence of a known tour, for a
    /// caller that already holds the id and date from session state.
    pub async fn reserve(&self, id: &TourId, date: DateTime<FixedOffset>) -> Reservation {
        reserve_occurrence(&self.gateway, &self.locales, id, date).await
    }
}
