//! Transactional full rebuild of a site-scoped search index.
//!
//! Elements of every type are re-indexed under each site they belong to,
//! inside one database transaction, with progress reported to an optional
//! job slot and an optional console.

pub mod config;
pub mod db;
pub mod error;
pub mod observability;
pub mod queue;
pub mod search;
pub mod store;
pub mod types;
