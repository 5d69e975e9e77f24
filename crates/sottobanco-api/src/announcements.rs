//! Handlers for the `/announcements` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/announcements` | Optional `?indirizzo`, `?anno`, `?type`, `?q` |
//! | `POST` | `/announcements` | Body: [`CreateBody`]; returns 201 + stored record |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use sottobanco_core::{
  listing::{Listing, NewListing},
  store::{AnnouncementFilter, ListingStore},
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub indirizzo: Option<String>,
  /// Kept as a string so a non-numeric value filters (to nothing) instead of
  /// failing extraction.
  pub anno:      Option<String>,
  #[serde(rename = "type")]
  pub kind:      Option<String>,
  pub q:         Option<String>,
}

impl From<ListParams> for AnnouncementFilter {
  fn from(p: ListParams) -> Self {
    // Empty values (`?type=`) count as absent, the same falsy check the
    // create path applies to required fields.
    fn supplied(v: Option<String>) -> Option<String> {
      v.filter(|s| !s.is_empty())
    }

    AnnouncementFilter {
      indirizzo: supplied(p.indirizzo),
      // A supplied but non-numeric year can never match a seeded class.
      anno:      supplied(p.anno).map(|a| a.parse().unwrap_or(-1)),
      kind:      supplied(p.kind),
      text:      supplied(p.q),
    }
  }
}

/// `GET /announcements[?indirizzo=...][&anno=...][&type=...][&q=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Listing>>, ApiError>
where
  S: ListingStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let listings = store
    .list_announcements(params.into())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(listings))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /announcements`.
///
/// Everything is optional at the serde level so presence can be checked in
/// one place, with one fixed message, before any store access.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub first_name:      Option<String>,
  pub last_name:       Option<String>,
  pub email:           Option<String>,
  pub phone:           Option<String>,
  pub socials:         Option<serde_json::Value>,
  #[serde(rename = "type")]
  pub kind:            Option<String>,
  pub title:           Option<String>,
  pub author:          Option<String>,
  pub edition:         Option<String>,
  pub isbn:            Option<String>,
  pub notes:           Option<String>,
  pub price:           Option<f64>,
  pub condition:       Option<String>,
  pub class_id:        Option<i64>,
  pub description:     Option<String>,
  pub contact_visible: Option<bool>,
}

impl CreateBody {
  /// Validate required fields. Empty strings count as missing, matching the
  /// front end's historical falsy check.
  fn into_new_listing(self) -> Result<NewListing, ApiError> {
    fn required(v: Option<String>) -> Option<String> {
      v.filter(|s| !s.is_empty())
    }

    let (
      Some(first_name),
      Some(last_name),
      Some(email),
      Some(kind),
      Some(title),
      Some(class_id),
    ) = (
      required(self.first_name),
      required(self.last_name),
      required(self.email),
      required(self.kind),
      required(self.title),
      self.class_id,
    )
    else {
      return Err(ApiError::BadRequest("missing required fields".to_string()));
    };

    Ok(NewListing {
      first_name,
      last_name,
      email,
      phone: self.phone,
      socials: self.socials,
      title,
      author: self.author,
      edition: self.edition,
      isbn: self.isbn,
      notes: self.notes,
      kind,
      price: self.price,
      condition: self.condition,
      class_id,
      description: self.description,
      contact_visible: self.contact_visible.unwrap_or(true),
    })
  }
}

/// `POST /announcements` — returns 201 + the stored record with its book
/// title.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ListingStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let input = body.into_new_listing()?;
  let created = store
    .publish(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(created)))
}
