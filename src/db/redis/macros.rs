/// Serves a value from the cache, computing and caching it on a miss.
///
/// A failed cache read is logged and treated as a miss, so the cache never
/// fails the caller. A failure of the computing block still propagates.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::db::Cache) reference.
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: time-to-live for a freshly computed value, in seconds.
/// * `$block`: a future producing `AppResult<T>` on a miss.
///
/// # Example
/// ```rust,ignore
/// async fn genres(cache: &Cache, store: &dyn CatalogStore) -> AppResult<Vec<String>> {
///     cached!(cache, CacheKey::Genres, 3600, collect_genres(store))
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            Ok(None) => {
                tracing::debug!(key = %key, "Cache miss");
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, using store");
                let value = $block.await?;
                Ok(value)
            }
        }
    }};
}
