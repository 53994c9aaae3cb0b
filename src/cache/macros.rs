/// A macro to simplify read-through caching.
///
/// Checks the cache for `$key` and returns the stored value on a hit.
/// On a miss it awaits `$block`, queues the result for storage with the
/// given TTL and returns it. Hits and misses are logged at debug level with
/// the cache key, so a cold cache shows up in traces.
///
/// Errors from the cache lookup or from `$block` are propagated with `?`,
/// so the enclosing function must return `AppResult`. Failed computations
/// are never stored.
///
/// # Arguments
/// * `$cache`: The cache instance. It must have `get_from_cache` and
///   `set_in_background` methods.
/// * `$key`: The `CacheKey` for the value.
/// * `$ttl`: Time-to-live for the stored value in seconds.
/// * `$block`: Future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let details = cached!(cache, CacheKey::MovieDetails(id), 3600, async move {
///     fetch_from_api(id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await? {
            Some(hit) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(hit)
            }
            None => {
                tracing::debug!(key = %key, "Cache miss");
                let value = $block.await?;
                // Stored off the request path; the caller gets the value now
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
