//! Service layer for the almanac pipeline.
//!
//! This module contains the facet fetching logic (`FacetFetcher`) and its
//! network boundary (`FacetSource`).

mod facets;

pub use facets::{FacetFetcher, FacetSet, FacetSource, HttpFacetSource};
