//! Client for the public open-data dataset API
//!
//! - `models`: dataset and resource metadata
//! - `client`: metadata fetch, resource selection and table download

pub mod client;
pub mod models;

pub use client::{select_resource, DatasetTable, OpenDataClient, PREFERRED_FORMATS};
pub use models::{Dataset, Resource};
