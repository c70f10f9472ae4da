//! Core types for the fittrack workout tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the record shapes, the legacy/current field-name normalizer, the
//! owner-scoped repository over any [`store::DocumentStore`], and the
//! synthetic data used when the store cannot be reached.

pub mod error;
pub mod fallback;
pub mod memory;
pub mod model;
pub mod normalize;
pub mod repository;
pub mod resource;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
