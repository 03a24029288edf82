use std::{collections::BTreeSet, path::Path};

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::CatalogRow,
    services::query_builder::CatalogQuery,
};

/// Catalog store holding its rows in process
///
/// Evaluates the same predicate and ordering semantics as the Postgres store.
/// Serves tests and local runs seeded from a JSON array of rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    rows: Vec<CatalogRow>,
}

impl MemoryCatalogStore {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self { rows }
    }

    /// Loads rows from a JSON file containing an array of catalog rows
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(format!("Failed to read seed file {}: {}", path.display(), e))
        })?;
        let rows: Vec<CatalogRow> = serde_json::from_str(&contents).map_err(|e| {
            AppError::Internal(format!("Invalid seed file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), rows = rows.len(), "Loaded catalog seed");

        Ok(Self::new(rows))
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn query(&self, query: &CatalogQuery) -> AppResult<Vec<CatalogRow>> {
        let mut rows: Vec<CatalogRow> = self
            .rows
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();

        rows.sort_by(|a, b| query.order.compare(a, b));
        rows.truncate(query.limit as usize);

        Ok(rows)
    }

    async fn distinct_genres(&self) -> AppResult<Vec<String>> {
        Ok(distinct_text(self.rows.iter().map(|row| row.genre.as_deref()))
            .into_iter()
            .collect())
    }

    async fn distinct_stars(&self, limit: i64) -> AppResult<Vec<String>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(distinct_text(self.rows.iter().map(|row| row.stars.as_deref()))
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

fn distinct_text<'a>(values: impl Iterator<Item = Option<&'a str>>) -> BTreeSet<String> {
    values
        .flatten()
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
