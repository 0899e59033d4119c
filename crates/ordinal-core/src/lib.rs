//! ordinal-core library.
//!
//! Manual ordering for hierarchical content records: a record store
//! abstraction, a SQLite-backed store, and the resequencer that recomputes
//! sibling positions after a drag-and-drop move.
//!
//! # Conventions
//!
//! - **Errors**: Store implementations return `anyhow::Result`; the
//!   resequencer and service surface [`error::OrderingError`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod capabilities;
pub mod config;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod resequence;
pub mod service;
pub mod store;
