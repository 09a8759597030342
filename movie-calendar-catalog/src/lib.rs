//! Movie catalog data model types and title normalization.
//!
//! This crate defines the persistent data model for release records without
//! any database or network dependencies. Consumers pass these types to
//! `movie-calendar-db` for persistence and receive them back from the
//! reconciliation engine in `movie-calendar-sync`.

pub mod title;
pub mod types;

pub use title::{ParsedTitle, clean_title, identity_key, parse_title, record_id, search_candidates};
pub use types::*;
