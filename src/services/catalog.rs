use std::{collections::BTreeSet, sync::Arc};

use crate::{
    cached,
    config::Config,
    db::{Cache, CacheKey, CatalogStore},
    error::AppResult,
    models::{FilterCriteria, NormalizedRecord},
    services::{
        normalizer::{self, cast_names, is_listable_actor, parse_genres},
        query_builder::build_query,
        recommender::{match_confidence, recommend},
    },
};

/// Tunables for the catalog operations
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    pub actor_scan_limit: i64,
    pub actor_result_limit: usize,
    pub vocabulary_cache_ttl: u64,
    pub default_target_runtime: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            actor_scan_limit: 2000,
            actor_result_limit: 200,
            vocabulary_cache_ttl: 300,
            default_target_runtime: 115,
        }
    }
}

impl From<&Config> for CatalogSettings {
    fn from(config: &Config) -> Self {
        Self {
            actor_scan_limit: config.actor_scan_limit,
            actor_result_limit: config.actor_result_limit,
            vocabulary_cache_ttl: config.vocabulary_cache_ttl,
            default_target_runtime: config.default_target_runtime,
        }
    }
}

/// Normalized search results with the single recommended record
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub records: Vec<NormalizedRecord>,
    pub recommendation: Option<NormalizedRecord>,
    /// Percentage fit of the recommendation to the target runtime
    pub match_confidence: Option<u8>,
}

/// Catalog operations exposed to the HTTP layer
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    cache: Option<Cache>,
    settings: CatalogSettings,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        cache: Option<Cache>,
        settings: CatalogSettings,
    ) -> Self {
        Self {
            store,
            cache,
            settings,
        }
    }

    /// Filters the catalog, normalizes the matching rows and picks a recommendation
    ///
    /// A store failure fails the whole search; no partial list is returned.
    pub async fn search(
        &self,
        criteria: &FilterCriteria,
        target_runtime: Option<u32>,
    ) -> AppResult<SearchOutcome> {
        let query = build_query(criteria);
        let target_runtime = target_runtime.unwrap_or(self.settings.default_target_runtime);

        tracing::info!(
            store = self.store.name(),
            predicates = query.predicates.len(),
            sort = query.order.as_str(),
            limit = query.limit,
            "Searching catalog"
        );

        let rows = self.store.query(&query).await.map_err(|e| {
            tracing::error!(error = %e, "Catalog query failed");
            e
        })?;

        let records: Vec<NormalizedRecord> = rows.iter().map(normalizer::normalize).collect();
        let recommendation = recommend(&records, target_runtime).cloned();
        let confidence = recommendation
            .as_ref()
            .map(|record| match_confidence(record, target_runtime));

        tracing::info!(
            found = records.len(),
            recommended = recommendation.as_ref().map(|r| r.title.as_str()),
            confidence,
            "Catalog search completed"
        );

        Ok(SearchOutcome {
            records,
            recommendation,
            match_confidence: confidence,
        })
    }

    /// Every individual genre token in the catalog, deduplicated and sorted
    ///
    /// With a cache configured the list may lag a catalog import by up to
    /// `vocabulary_cache_ttl` seconds.
    pub async fn genres(&self) -> AppResult<Vec<String>> {
        match &self.cache {
            Some(cache) => self.cached_genres(cache).await,
            None => collect_genres(self.store.as_ref()).await,
        }
    }

    /// Cleaned actor names from the catalog's cast lists, deduplicated, sorted and capped
    ///
    /// Cached like [`CatalogService::genres`], with the same staleness window.
    pub async fn actors(&self) -> AppResult<Vec<String>> {
        match &self.cache {
            Some(cache) => self.cached_actors(cache).await,
            None => {
                collect_actors(
                    self.store.as_ref(),
                    self.settings.actor_scan_limit,
                    self.settings.actor_result_limit,
                )
                .await
            }
        }
    }

    /// Checks that the store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }

    async fn cached_genres(&self, cache: &Cache) -> AppResult<Vec<String>> {
        cached!(
            cache,
            CacheKey::Genres,
            self.settings.vocabulary_cache_ttl,
            collect_genres(self.store.as_ref())
        )
    }

    async fn cached_actors(&self, cache: &Cache) -> AppResult<Vec<String>> {
        let scan_limit = self.settings.actor_scan_limit;
        let result_limit = self.settings.actor_result_limit;
        cached!(
            cache,
            CacheKey::Actors {
                scan_limit,
                result_limit
            },
            self.settings.vocabulary_cache_ttl,
            collect_actors(self.store.as_ref(), scan_limit, result_limit)
        )
    }
}

async fn collect_genres(store: &dyn CatalogStore) -> AppResult<Vec<String>> {
    let raw = store.distinct_genres().await?;

    let genres: BTreeSet<String> = raw.iter().flat_map(|text| parse_genres(text)).collect();
    tracing::debug!(sources = raw.len(), genres = genres.len(), "Collected genres");

    Ok(genres.into_iter().collect())
}

async fn collect_actors(
    store: &dyn CatalogStore,
    scan_limit: i64,
    result_limit: usize,
) -> AppResult<Vec<String>> {
    let raw = store.distinct_stars(scan_limit).await?;

    let actors: BTreeSet<String> = raw
        .iter()
        .flat_map(|text| cast_names(text))
        .filter(|name| is_listable_actor(name))
        .collect();
    tracing::debug!(sources = raw.len(), actors = actors.len(), "Collected actors");

    Ok(actors.into_iter().take(result_limit).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::store::MockCatalogStore,
        error::AppError,
        models::{CatalogRow, SortOrder, DEFAULT_LIMIT},
    };
    use mockall::predicate::eq;

    fn service(store: MockCatalogStore) -> CatalogService {
        CatalogService::new(Arc::new(store), None, CatalogSettings::default())
    }

    fn row(title: &str, rating: f64, duration: &str) -> CatalogRow {
        CatalogRow {
            title: Some(title.to_string()),
            rating: Some(rating),
            duration: Some(duration.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_search_normalizes_and_recommends() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_query()
            .withf(|query| {
                query.predicates.is_empty()
                    && query.order == SortOrder::ScoreDesc
                    && query.limit == DEFAULT_LIMIT
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    row("Long Epic", 9.0, "150 min"),
                    row("Tight Thriller", 9.0, "90 min"),
                    row("Decent Drama", 7.0, "100 min"),
                ])
            });

        let outcome = service(store)
            .search(&FilterCriteria::default(), Some(100))
            .await
            .unwrap();

        let titles: Vec<_> = outcome.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Long Epic", "Tight Thriller", "Decent Drama"]);
        assert_eq!(outcome.recommendation.unwrap().title, "Tight Thriller");
        assert_eq!(outcome.match_confidence, Some(87));
    }

    #[tokio::test]
    async fn test_search_uses_default_target_runtime() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store.expect_query().returning(|_| {
            Ok(vec![row("Short", 8.0, "60 min"), row("Near Default", 8.0, "118 min")])
        });

        let outcome = service(store)
            .search(&FilterCriteria::default(), None)
            .await
            .unwrap();

        assert_eq!(outcome.recommendation.unwrap().title, "Near Default");
    }

    #[tokio::test]
    async fn test_search_with_no_rows_has_no_recommendation() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store.expect_query().returning(|_| Ok(vec![]));

        let outcome = service(store)
            .search(&FilterCriteria::default(), Some(90))
            .await
            .unwrap();

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.recommendation, None);
        assert_eq!(outcome.match_confidence, None);
    }

    #[tokio::test]
    async fn test_search_store_failure_fails_request() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_query()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let result = service(store).search(&FilterCriteria::default(), None).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_genres_split_dedupe_and_sort() {
        let mut store = MockCatalogStore::new();
        store.expect_distinct_genres().returning(|| {
            Ok(vec![
                "Drama, Comedy".to_string(),
                "Comedy,Drama".to_string(),
                "Action".to_string(),
            ])
        });

        let genres = service(store).genres().await.unwrap();
        assert_eq!(genres, vec!["Action", "Comedy", "Drama"]);
    }

    #[tokio::test]
    async fn test_actors_are_cleaned_deduped_sorted_and_capped() {
        let mut store = MockCatalogStore::new();
        store
            .expect_distinct_stars()
            .with(eq(2000))
            .returning(|_| {
                Ok(vec![
                    "['Zoe Kazan', 'Ana Cruz', 'N/A']".to_string(),
                    "['Ana Cruz', 'Documentary', '1999', 'X']".to_string(),
                    "Bo Li, Zoe Kazan, Documentary Crew, Mia Wong".to_string(),
                ])
            });

        let settings = CatalogSettings {
            actor_result_limit: 3,
            ..Default::default()
        };
        let service = CatalogService::new(Arc::new(store), None, settings);

        let actors = service.actors().await.unwrap();
        assert_eq!(actors, vec!["Ana Cruz", "Bo Li", "Mia Wong"]);
    }

    #[tokio::test]
    async fn test_ping_delegates_to_store() {
        let mut store = MockCatalogStore::new();
        store
            .expect_ping()
            .returning(|| Err(AppError::Internal("down".to_string())));

        assert!(service(store).ping().await.is_err());
    }
}
