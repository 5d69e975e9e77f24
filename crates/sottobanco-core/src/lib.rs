//! Core types and trait definitions for the sottobanco listing store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod class;
pub mod listing;
pub mod store;
