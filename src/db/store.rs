use crate::{
    error::AppResult,
    models::CatalogRow,
    services::query_builder::CatalogQuery,
};

/// Catalog storage abstraction
///
/// The store owns the catalog rows and turns a [`CatalogQuery`] into whatever
/// its backing engine understands. It is constructed once at startup and
/// shared by every request.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Rows matching every predicate, in the query's order, at most `limit` of them
    async fn query(&self, query: &CatalogQuery) -> AppResult<Vec<CatalogRow>>;

    /// Every distinct non-empty raw genre text
    async fn distinct_genres(&self) -> AppResult<Vec<String>>;

    /// Up to `limit` distinct non-empty raw stars texts
    async fn distinct_stars(&self, limit: i64) -> AppResult<Vec<String>>;

    /// Round-trips to the backing engine
    async fn ping(&self) -> AppResult<()>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}
