//! The `ListingStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `sottobanco-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  class::SchoolClass,
  listing::{CreatedAnnouncement, Listing, NewListing},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ListingStore::list_announcements`].
///
/// All supplied filters are combined with AND; inactive announcements are
/// excluded regardless of what is set here.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementFilter {
  /// Exact match on the joined class track.
  pub indirizzo: Option<String>,
  /// Exact match on the joined class year.
  pub anno:      Option<i64>,
  /// Exact match on the announcement category (`type` on the wire).
  pub kind:      Option<String>,
  /// Substring match over book title, book author, or description.
  pub text:      Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a sottobanco storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ListingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All classes, ordered by track then year, ascending.
  fn list_classes(
    &self,
  ) -> impl Future<Output = Result<Vec<SchoolClass>, Self::Error>> + Send + '_;

  /// The active announcement feed matching `filter`, newest first, each row
  /// flattened with its book, class, and user.
  fn list_announcements(
    &self,
    filter: AnnouncementFilter,
  ) -> impl Future<Output = Result<Vec<Listing>, Self::Error>> + Send + '_;

  /// Publish an announcement: find-or-create the user by email, insert the
  /// book, insert the announcement, and return the stored record with its
  /// book title.
  ///
  /// A repeat submission from a known email overwrites that user's contact
  /// fields (the email itself never changes); it never creates a second user
  /// row for the same email within one request.
  fn publish(
    &self,
    input: NewListing,
  ) -> impl Future<Output = Result<CreatedAnnouncement, Self::Error>> + Send + '_;
}
