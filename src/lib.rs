//! floorview: shop-floor dashboards built from CSV snapshots.
//!
//! Each page runs the same pipeline: fetch a snapshot ([`fetch`]), parse it
//! ([`dataset`]), route records into tiles or grid rows ([`classify`]),
//! derive filter panes ([`facets`]), render ([`grid`], [`page`]) and stamp
//! the snapshot time.

pub mod analytics;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod facets;
pub mod fetch;
pub mod grid;
pub mod page;
pub mod web;
