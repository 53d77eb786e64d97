mod common;

use common::{blob, build_test_cache, Blob};
use fibre_object_cache::{CacheLimits, CacheStats, ObjectCache};
use std::sync::Arc;

#[test]
fn test_sync_insert_and_get() {
  let cache = build_test_cache(1_000, 0);
  cache.insert(1, blob(10, 100));

  let value = cache.get(&1).expect("inserted value should be cached");
  assert_eq!(value.tag, 10);
  assert!(cache.get(&2).is_none());

  let metrics = cache.metrics();
  assert_eq!(metrics.hits, 1);
  assert_eq!(metrics.misses, 1);
  assert_eq!(metrics.inserts, 1);
}

#[test]
fn test_sync_get_returns_shared_handle() {
  let cache = build_test_cache(1_000, 0);
  let value = blob(1, 10);
  cache.insert(1, value.clone());

  let fetched = cache.get(&1).unwrap();
  assert!(Arc::ptr_eq(&value, &fetched), "the cache must hand out the same allocation");
  // Our two handles plus the cache's own share.
  assert_eq!(Arc::strong_count(&value), 3);
}

#[test]
fn test_sync_replace_updates_value_and_totals() {
  let cache = build_test_cache(1_000, 0);
  cache.insert(7, blob(1, 100));
  cache.insert(7, blob(2, 40));

  assert_eq!(cache.get(&7).unwrap().tag, 2);
  assert_eq!(
    cache.stats(),
    CacheStats {
      total_size_in_bytes: 40,
      object_count: 1
    },
    "totals must reflect only the new size"
  );

  let metrics = cache.metrics();
  assert_eq!(metrics.inserts, 1);
  assert_eq!(metrics.replacements, 1);
  assert_eq!(metrics.total_bytes_added, 140);
}

#[test]
fn test_sync_replaced_value_survives_in_other_holders() {
  let cache = build_test_cache(1_000, 0);
  let original = blob(1, 10);
  cache.insert(1, original.clone());
  cache.insert(1, blob(2, 10));

  assert_eq!(Arc::strong_count(&original), 1, "the cache released its share");
  assert_eq!(original.tag, 1);
}

#[test]
fn test_sync_peek_and_contains_do_not_count() {
  let cache = build_test_cache(1_000, 0);
  cache.insert(1, blob(1, 10));

  assert!(cache.contains(&1));
  assert!(!cache.contains(&2));
  assert_eq!(cache.peek(&1).map(|b| b.tag), Some(1));
  assert!(cache.peek(&2).is_none());

  let metrics = cache.metrics();
  assert_eq!(metrics.hits, 0);
  assert_eq!(metrics.misses, 0);
}

#[test]
fn test_sync_invalidate() {
  let cache = build_test_cache(1_000, 0);
  cache.insert(1, blob(1, 10));
  cache.insert(2, blob(2, 20));

  let removed = cache.invalidate(&1).expect("key 1 was present");
  assert_eq!(removed.tag, 1);
  assert!(cache.invalidate(&1).is_none());
  assert!(cache.get(&1).is_none());

  assert_eq!(cache.stats().total_size_in_bytes, 20);
  assert_eq!(cache.len(), 1);
  assert_eq!(cache.metrics().invalidations, 1);
}

#[test]
fn test_sync_clear() {
  let cache = build_test_cache(1_000, 0);
  for key in 0..10 {
    cache.insert(key, blob(key, 5));
  }
  assert_eq!(cache.len(), 10);

  cache.clear();
  assert!(cache.is_empty());
  assert_eq!(cache.stats(), CacheStats::default());
  assert!(cache.get(&3).is_none());

  // The cache is fully usable afterwards.
  cache.insert(3, blob(3, 5));
  assert_eq!(cache.stats().total_size_in_bytes, 5);
}

#[test]
fn test_sync_borrowed_key_lookup() {
  let cache: ObjectCache<String, Blob> = ObjectCache::new(CacheLimits {
    byte_budget: 100,
    minimum_items: 0,
  });
  cache.insert("root".to_string(), blob(1, 10));

  assert!(cache.get("root").is_some());
  assert!(cache.contains("root"));
  assert!(cache.invalidate("root").is_some());
}

#[test]
fn test_sync_insert_with_explicit_size() {
  let cache: ObjectCache<u64, &'static str> = ObjectCache::new(CacheLimits {
    byte_budget: 100,
    minimum_items: 0,
  });
  cache.insert_with_size(1, Arc::new("a"), 60);
  cache.insert_with_size(2, Arc::new("b"), 60);

  assert!(!cache.contains(&1));
  assert_eq!(cache.stats().total_size_in_bytes, 60);
}
