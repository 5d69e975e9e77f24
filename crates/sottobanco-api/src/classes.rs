//! Handler for the `/classes` endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use sottobanco_core::{class::SchoolClass, store::ListingStore};

use crate::error::ApiError;

/// `GET /classes` — every seeded (track, year) pair, ordered by track then
/// year.
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<SchoolClass>>, ApiError>
where
  S: ListingStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let classes = store
    .list_classes()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(classes))
}
