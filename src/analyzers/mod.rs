//! Filtering, redistribution and the derived dashboard views.
//!
//! Every function here is pure: unfiltered tables and filter parameters in,
//! computed views out. Loading and caching live in [`crate::tables`].

pub mod dashboard;
pub mod filter;
pub mod kpi;
pub mod ranking;
pub mod series;
pub mod utility;
