//! Terminal outcomes of the public booking operations.
//!
//! Every public operation converts upstream failures into one of these
//! values at its boundary; none of them carries a raw transport error. The
//! response composer turns them into locale-appropriate phrasing.

use serde::{Deserialize, Serialize};

use crate::{ResolvedNextTour, TourSummary};

/// Result of listing the catalog.
///
/// A fetch failure is deliberately distinguishable from a genuinely empty
/// catalog so the composer can phrase "no tours" and "store unreachable"
/// differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Listing {
    /// Tours in catalog order.
    Tours(Vec<TourSummary>),
    /// The store answered and holds no tours.
    Empty,
    /// The store could not be reached or answered with an error.
    Unavailable,
}

/// Result of resolving the next occurrence with open capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NextTour {
    Found {
        tour: ResolvedNextTour,
        /// Whether the occurrence falls on the current calendar date in its
        /// own offset. Drives the composer's same-day phrasing branch.
        today: bool,
    },
    /// No occurrence anywhere has seats left.
    NoneAvailable,
    Unavailable,
}

/// Remaining seats for a tour located by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stock {
    Available { title: String, seats: u32 },
    NotFound,
}

/// Price of a tour located by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Price {
    Priced { title: String, price: f64 },
    NotFound,
}

/// Result of a reservation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reservation {
    /// Every locale representation was decremented.
    Reserved { title: String },
    /// The occurrence was found but had no seats left at read time.
    OutOfStock { title: String },
    /// Nothing to reserve: no available occurrence, or unknown tour id.
    NotFound,
    /// A concurrent writer changed the record between read and write; no
    /// seat was taken.
    Conflict,
    /// A locale read or write failed mid-sequence. Locales committed before
    /// the failure stay committed; the rest are untouched.
    Failed,
}

impl Reservation {
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(self, Self::Reserved { .. })
    }
}
