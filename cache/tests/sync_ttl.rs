mod common;

use common::{build_test_cache, TestStore};
use sharded_cache::{CacheBuilder, CacheMetrics, Ttl};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_sync_ttl_sentinels() {
  let cache = build_test_cache(2);
  cache.put("plain", "v".to_string()).unwrap();
  cache
    .put_with_ttl("timed", "v".to_string(), Duration::from_secs(60))
    .unwrap();

  assert_eq!(cache.ttl("plain"), Ttl::Persistent);
  assert_eq!(cache.ttl("plain").as_millis(), -1);
  assert_eq!(cache.ttl("absent"), Ttl::Missing);
  assert_eq!(cache.ttl("absent").as_millis(), -2);

  let remaining = cache.ttl("timed").remaining().unwrap();
  assert!(remaining > Duration::from_secs(59));
  assert!(remaining <= Duration::from_secs(60));
  assert!(cache.ttl("timed").as_millis() > 0);
}

#[test]
fn test_sync_zero_ttl_means_no_expiry() {
  let cache = build_test_cache(1);
  cache
    .put_with_ttl("k", "v".to_string(), Duration::ZERO)
    .unwrap();
  assert_eq!(cache.ttl("k"), Ttl::Persistent);
}

#[test]
fn test_sync_entry_expires_after_ttl() {
  let metrics = Arc::new(CacheMetrics::new());
  let cache = CacheBuilder::<String>::new()
    .shards(2)
    .expire_after_access(Duration::from_secs(3600))
    .metrics(metrics.clone())
    .build()
    .unwrap();
  cache
    .put_with_ttl("k", "v".to_string(), Duration::from_millis(50))
    .unwrap();
  assert!(matches!(cache.ttl("k"), Ttl::Remaining(_)));

  thread::sleep(Duration::from_millis(120));
  assert_eq!(cache.ttl("k"), Ttl::Missing);
  assert!(cache.get("k").unwrap().is_none());
  // The expired entry was dropped on access.
  assert!(cache.is_empty());
  assert_eq!(metrics.snapshot().expirations, 1);
}

#[test]
fn test_sync_ttl_without_strategy_is_reported_only() {
  let cache = build_test_cache(1);
  cache
    .put_with_ttl("k", "v".to_string(), Duration::from_millis(20))
    .unwrap();
  thread::sleep(Duration::from_millis(60));

  // No strategy: the deadline shows in `ttl` but never hides the entry.
  assert_eq!(cache.ttl("k"), Ttl::Missing);
  assert_eq!(*cache.get("k").unwrap().unwrap(), "v");
}

#[test]
fn test_sync_expire_sets_a_deadline() {
  let cache = CacheBuilder::<String>::new()
    .shards(2)
    .expire_after_access(Duration::from_secs(3600))
    .build()
    .unwrap();
  cache.put("k", "v".to_string()).unwrap();

  assert!(cache.expire("k", Duration::from_secs(30)));
  let remaining = cache.ttl("k").remaining().unwrap();
  assert!(remaining <= Duration::from_secs(30));
  assert!(!cache.expire("absent", Duration::from_secs(30)));

  assert!(cache.expire("k", Duration::from_millis(30)));
  thread::sleep(Duration::from_millis(80));
  assert!(cache.get("k").unwrap().is_none());
}

#[test]
fn test_sync_expire_after_access_slides() {
  let cache = CacheBuilder::<String>::new()
    .shards(1)
    .expire_after_access(Duration::from_millis(200))
    .build()
    .unwrap();
  cache.put("k", "v".to_string()).unwrap();
  assert!(matches!(cache.ttl("k"), Ttl::Remaining(_)));

  // Each read pushes the deadline out again.
  for _ in 0..4 {
    thread::sleep(Duration::from_millis(100));
    assert!(cache.get("k").unwrap().is_some());
  }

  thread::sleep(Duration::from_millis(350));
  assert!(cache.get("k").unwrap().is_none());
}

#[test]
fn test_sync_expire_after_access_keeps_explicit_ttl() {
  let cache = CacheBuilder::<String>::new()
    .shards(1)
    .expire_after_access(Duration::from_secs(3600))
    .build()
    .unwrap();
  cache
    .put_with_ttl("k", "v".to_string(), Duration::from_secs(5))
    .unwrap();
  let remaining = cache.ttl("k").remaining().unwrap();
  assert!(remaining <= Duration::from_secs(5));
}

#[test]
fn test_sync_expired_entry_is_reloaded() {
  let store = Arc::new(TestStore::with_entries([("k", "fresh")]));
  let cache = CacheBuilder::new()
    .shards(1)
    .expire_after_access(Duration::from_secs(3600))
    .loader(store.clone())
    .build()
    .unwrap();
  cache
    .put_with_ttl("k", "stale".to_string(), Duration::from_millis(30))
    .unwrap();

  thread::sleep(Duration::from_millis(80));
  assert_eq!(*cache.get("k").unwrap().unwrap(), "fresh");
  assert_eq!(store.load_calls(), 1);
  assert_eq!(*cache.get("k").unwrap().unwrap(), "fresh");
  assert_eq!(store.load_calls(), 1);
}

#[test]
fn test_sync_unbounded_ttls_saturate() {
  let cache = CacheBuilder::<String>::new()
    .shards(1)
    .expire_after_access(Duration::MAX)
    .build()
    .unwrap();

  cache.put("plain", "v".to_string()).unwrap();
  assert_eq!(*cache.get("plain").unwrap().unwrap(), "v");
  assert!(matches!(cache.ttl("plain"), Ttl::Remaining(_)));

  cache
    .put_with_ttl("timed", "v".to_string(), Duration::MAX)
    .unwrap();
  assert!(matches!(cache.ttl("timed"), Ttl::Remaining(_)));

  assert!(cache.expire("plain", Duration::MAX));
  let remaining = cache.ttl("plain").remaining().unwrap();
  assert!(remaining > Duration::from_secs(365 * 24 * 60 * 60));
  assert!(cache.get("plain").unwrap().is_some());
}
