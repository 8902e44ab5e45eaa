//! Core domain logic for evapro: models, settings, and the sync and
//! forwarding jobs. Storage and remote access live behind traits so the
//! CLI can wire in the SQLite store and the MySQL LIMS client.

pub mod errors;
pub mod forward;
pub mod projects;
pub mod settings;
pub mod sync;

pub use errors::{Error, Result};
