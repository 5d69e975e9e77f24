//! Listings — announcements with their book, class, and contact data.
//!
//! An announcement references exactly one user, one book, and one class. The
//! references are nullable in the store (deleting a user or book nulls them
//! rather than removing the announcement), so the joined columns of a
//! [`Listing`] are all optional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Input ───────────────────────────────────────────────────────────────────

/// A validated announcement submission, ready to be published.
///
/// Required fields are plain `String`s here; presence checks happen at the
/// HTTP boundary before any store access.
#[derive(Debug, Clone)]
pub struct NewListing {
  // Contact profile — upserted by email.
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub phone:      Option<String>,
  /// Structured social handles; serialized to flat text in the store.
  pub socials:    Option<serde_json::Value>,

  // Book — always inserted as a new row, never deduplicated.
  pub title:   String,
  pub author:  Option<String>,
  pub edition: Option<String>,
  pub isbn:    Option<String>,
  pub notes:   Option<String>,

  // The announcement itself.
  /// Free-text category, e.g. `sell` / `buy` / `exchange`.
  pub kind:            String,
  pub price:           Option<f64>,
  pub condition:       Option<String>,
  pub class_id:        i64,
  pub description:     Option<String>,
  pub contact_visible: bool,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// One row of the announcement feed: the raw announcement columns flattened
/// with its book, class, and user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
  pub id:              i64,
  #[serde(rename = "type")]
  pub kind:            String,
  pub price:           Option<f64>,
  pub condition:       Option<String>,
  pub description:     Option<String>,
  pub contact_visible: bool,
  pub is_active:       bool,
  pub created_at:      DateTime<Utc>,
  pub expires_at:      Option<DateTime<Utc>>,
  pub user_id:         Option<i64>,
  pub book_id:         Option<i64>,
  pub class_id:        Option<i64>,

  // Joined book.
  pub title:  Option<String>,
  pub author: Option<String>,

  // Joined class.
  pub indirizzo: Option<String>,
  pub anno:      Option<i64>,

  // Joined user.
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub socials:    Option<String>,
}

/// Response body of a successful publish: the stored announcement plus its
/// book's title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedAnnouncement {
  pub id:              i64,
  #[serde(rename = "type")]
  pub kind:            String,
  pub price:           Option<f64>,
  pub condition:       Option<String>,
  pub description:     Option<String>,
  pub contact_visible: bool,
  pub is_active:       bool,
  pub created_at:      DateTime<Utc>,
  pub expires_at:      Option<DateTime<Utc>>,
  pub user_id:         Option<i64>,
  pub book_id:         Option<i64>,
  pub class_id:        Option<i64>,
  pub title:           String,
}
