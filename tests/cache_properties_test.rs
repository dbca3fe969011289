//! Index cache behavior against a live Redis instance.
//!
//! Ignored by default; run with a disposable Redis:
//!
//! ```sh
//! REDIS_URL=redis://localhost:6379 cargo test -- --ignored
//! ```

use blog_service::cache::IndexCache;
use redis::aio::ConnectionManager;

async fn test_cache() -> IndexCache {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let client = redis::Client::open(url).expect("well-formed Redis URL");
    let manager = ConnectionManager::new(client)
        .await
        .expect("connect to test Redis");
    IndexCache::new(manager, 20)
}

#[tokio::test]
#[ignore]
async fn put_serves_hits_until_invalidated() {
    let cache = test_cache().await;

    // Start from a clean slate regardless of prior runs.
    cache.invalidate().await.unwrap();
    assert_eq!(cache.get().await, None);

    cache.put(b"first rendering").await;
    assert_eq!(cache.get().await.as_deref(), Some(&b"first rendering"[..]));
    // A hit does not consume the entry.
    assert_eq!(cache.get().await.as_deref(), Some(&b"first rendering"[..]));

    cache.invalidate().await.unwrap();
    assert_eq!(cache.get().await, None);

    // The next write after invalidation takes over the entry.
    cache.put(b"second rendering").await;
    assert_eq!(cache.get().await.as_deref(), Some(&b"second rendering"[..]));
}
