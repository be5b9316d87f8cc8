mod common;

use common::TestStore;
use sharded_cache::{BuildError, CacheBuilder, CacheConfig, Ttl, WritePolicyMode};
use std::sync::Arc;

#[test]
fn test_builder_defaults() {
  let cache = CacheBuilder::<String>::new().build().unwrap();
  assert!(cache.shard_count() >= 4);
  assert_eq!(cache.shard_count() % 4, 0);
  assert_eq!(cache.capacity(), usize::MAX);
}

#[test]
fn test_builder_accepts_non_power_of_two_shards() {
  let cache = CacheBuilder::<String>::new()
    .shards(3)
    .capacity(9)
    .build()
    .unwrap();
  assert_eq!(cache.shard_count(), 3);
  assert_eq!(cache.capacity(), 9);
}

#[test]
fn test_builder_rejects_zero_write_buffer() {
  let err = CacheBuilder::<String>::new()
    .loader(Arc::new(TestStore::new()))
    .write_back(0)
    .build()
    .unwrap_err();
  assert_eq!(err, BuildError::ZeroWriteBuffer);
}

#[test]
fn test_builder_policy_name_is_case_insensitive() {
  for name in ["lru", "Lfu", "FIFO"] {
    assert!(CacheBuilder::<String>::new()
      .eviction_policy_name(name)
      .build()
      .is_ok());
  }
}

#[test]
fn test_config_default_matches_builder_default() {
  let config = CacheConfig::default();
  let cache = CacheBuilder::<String>::from_config(&config).build().unwrap();
  assert_eq!(cache.shard_count(), config.shards);
  assert_eq!(cache.capacity(), usize::MAX);
}

#[test]
fn test_config_unknown_policy_fails_fast() {
  let config = CacheConfig {
    eviction_policy: "RANDOM".to_string(),
    ..CacheConfig::default()
  };
  let err = CacheBuilder::<String>::from_config(&config).build().unwrap_err();
  assert_eq!(err, BuildError::UnknownEvictionPolicy("RANDOM".to_string()));
}

#[test]
fn test_config_with_expiration_and_write_through() {
  let store = Arc::new(TestStore::new());
  let config = CacheConfig {
    shards: 2,
    capacity: 10,
    eviction_policy: "fifo".to_string(),
    expire_after_access_ms: Some(60_000),
    write_policy: Some(WritePolicyMode::WriteThrough),
  };
  let cache = CacheBuilder::from_config(&config)
    .loader(store.clone())
    .build()
    .unwrap();

  cache.put("k", "v".to_string()).unwrap();
  assert!(matches!(cache.ttl("k"), Ttl::Remaining(_)));
  // The sliding TTL marks the write as expiring, so it is not forwarded.
  assert_eq!(store.put_calls(), 0);
}

#[cfg(feature = "serde")]
#[test]
fn test_config_from_json() {
  let store = Arc::new(TestStore::new());
  let config: CacheConfig = serde_json::from_str(
    r#"{
      "shards": 2,
      "capacity": 4,
      "eviction_policy": "LRU",
      "write_policy": { "mode": "write_back", "buffer": 8 }
    }"#,
  )
  .unwrap();
  let cache = CacheBuilder::from_config(&config)
    .loader(store.clone())
    .build()
    .unwrap();

  cache.put("k", "v".to_string()).unwrap();
  cache.close();
  assert_eq!(store.value("k").as_deref(), Some("v"));
}

#[test]
fn test_config_write_policy_without_loader_is_rejected() {
  let config = CacheConfig {
    write_policy: Some(WritePolicyMode::WriteBack { buffer: 8 }),
    ..CacheConfig::default()
  };
  let err = CacheBuilder::<String>::from_config(&config).build().unwrap_err();
  assert_eq!(err, BuildError::MissingBackingStore);
}
