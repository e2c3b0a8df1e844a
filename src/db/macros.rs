/// A macro to simplify read-through caching with `MetadataCache`.
///
/// If `$key` is cached, the cached value is returned. Otherwise `$block` is
/// awaited, its value stored under `$key`, and returned. Errors from
/// `$block` propagate with `?` and are not cached.
///
/// # Arguments
/// * `$cache`: The cache to read and write. Must have async `get` and `put` methods.
/// * `$key`: The `CacheKey` for the value.
/// * `$block`: A future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let metadata = cached!(cache, CacheKey::metadata(title, content_type), async move {
///     fetch_from_providers(title).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get(&key).await {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.put(&key, &value).await;
            Ok(value)
        }
    }};
}
