//! Core domain types for Tourdesk.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the
//! application: the remote content client, the booking core, and whatever
//! response-composing layer sits on top.

mod outcome;
pub use outcome::{Listing, NextTour, Price, Reservation, Stock};

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identity of a tour in the remote content store.
///
/// The store hands out UUID strings; this core never inspects them, it only
/// routes them back into read/write calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TourId(String);

impl TourId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A locale the remote store keeps a representation of every tour in.
///
/// Each tour exists exactly once per supported locale; a seat mutation must
/// touch all of them to keep the physical occurrence consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    De,
}

impl Locale {
    /// Every locale the store maintains, primary first.
    pub const SUPPORTED: [Self; 2] = [Self::En, Self::De];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unsupported locale tag {0:?}")]
pub struct UnknownLocale(pub String);

impl std::str::FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "de" => Ok(Self::De),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

/// One scheduled instance of a tour.
///
/// Occurrences are embedded children of their tour, not independently
/// addressable records. `seats` is the remaining capacity and is never
/// negative; a zero-seat occurrence stays visible in the catalog but is
/// excluded from next-available selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: DateTime<FixedOffset>,
    pub seats: u32,
}

/// A bookable experience with its scheduled occurrences.
///
/// Owned by the remote store; read-only on this side except for the seat
/// mutation performed by a reservation. The occurrence list carries store
/// order and is not guaranteed sorted by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: TourId,
    pub title: String,
    pub location: String,
    /// Capacity class of the tour (group size), distinct from remaining seats.
    pub size: u32,
    pub price: f64,
    pub occurrences: Vec<Occurrence>,
}

/// The earliest future occurrence with open capacity, as picked by the
/// availability resolver.
///
/// Transient: recomputed per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNextTour {
    pub id: TourId,
    pub title: String,
    pub location: String,
    pub date: DateTime<FixedOffset>,
    pub price: f64,
    pub seats: u32,
    pub size: u32,
}

/// One line of the catalog listing handed to the response composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourSummary {
    pub title: String,
    pub size: u32,
}
