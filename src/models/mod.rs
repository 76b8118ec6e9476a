// src/models/mod.rs

//! Domain models for the almanac pipeline.

mod config;
mod facet;
mod record;

pub use config::{Config, FetcherConfig, PathsConfig};
pub use facet::{FacetKind, FacetOutcome, KeyScope};
pub use record::{DateKey, Record};
