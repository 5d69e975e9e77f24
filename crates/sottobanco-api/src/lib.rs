//! JSON REST API and static front-end serving for sottobanco.
//!
//! Exposes an axum [`Router`] backed by any
//! [`sottobanco_core::store::ListingStore`]. Requests under `/api` are JSON
//! endpoints; everything else is served from the public directory, falling
//! back to its `index.html` so the single-page front end can do client-side
//! routing.

pub mod announcements;
pub mod classes;
pub mod error;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use sottobanco_core::store::ListingStore;
use tower_http::{
  services::{ServeDir, ServeFile},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// under the process environment (so `PORT` selects the listening port).
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub db_path:    PathBuf,
  pub public_dir: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ListingStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the JSON API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ListingStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/classes", get(classes::list::<S>))
    .route(
      "/announcements",
      get(announcements::list::<S>).post(announcements::create::<S>),
    )
    .with_state(store)
}

/// Build the full application router: `/api` plus the SPA fallback.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ListingStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let spa = ServeDir::new(&state.config.public_dir)
    .fallback(ServeFile::new(state.config.public_dir.join("index.html")));

  Router::new()
    .nest("/api", api_router(state.store.clone()))
    .fallback_service(spa)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
