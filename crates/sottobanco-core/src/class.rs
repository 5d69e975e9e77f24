//! School classes — the (track, year) cohorts announcements are tied to.
//!
//! The class table is fully seeded at first boot from [`TRACKS`] × [`YEARS`]
//! and is read-only from the API surface.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// The fixed set of school tracks ("indirizzi"), in seeding order.
pub const TRACKS: [&str; 6] = [
  "Liceo Classico",
  "Liceo Economico Sociale",
  "Liceo Linguistico",
  "Liceo Scientifico",
  "Liceo delle Scienze Applicate",
  "Liceo delle Scienze Umane",
];

/// Years a class can span.
pub const YEARS: RangeInclusive<i64> = 1..=5;

/// A (track, year) pair identifying a cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolClass {
  pub id:        i64,
  pub indirizzo: String,
  pub anno:      i64,
}
