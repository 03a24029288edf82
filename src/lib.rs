//! Catalog discovery service: filters a flat movie/show catalog, normalizes
//! the matching rows and recommends a single best match.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
