pub mod catalog;
pub mod normalizer;
pub mod query_builder;
pub mod recommender;

pub use catalog::{CatalogService, CatalogSettings, SearchOutcome};
