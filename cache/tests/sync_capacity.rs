mod common;

use common::{blob, build_test_cache, live_totals};
use fibre_object_cache::CacheLimits;

#[test]
fn test_sync_evicts_least_recently_used() {
  // Room for exactly three 10-byte entries.
  let cache = build_test_cache(30, 0);
  cache.insert(1, blob(1, 10)); // A
  cache.insert(2, blob(2, 10)); // B
  cache.insert(3, blob(3, 10)); // C

  // Access in order A, B, C so that A is the oldest use.
  assert!(cache.get(&1).is_some());
  assert!(cache.get(&2).is_some());
  assert!(cache.get(&3).is_some());

  // Forces exactly one eviction.
  cache.insert(4, blob(4, 10));

  assert!(cache.get(&1).is_none(), "A had the oldest access and must be evicted");
  assert!(cache.get(&2).is_some());
  assert!(cache.get(&3).is_some());
  assert!(cache.get(&4).is_some());
  assert_eq!(cache.metrics().evicted_by_capacity, 1);
}

#[test]
fn test_sync_get_refreshes_recency() {
  let cache = build_test_cache(30, 0);
  cache.insert(1, blob(1, 10));
  cache.insert(2, blob(2, 10));
  cache.insert(3, blob(3, 10));

  // Touch the oldest insert; 2 becomes the least recently used.
  cache.get(&1);
  cache.insert(4, blob(4, 10));

  assert!(cache.contains(&1));
  assert!(!cache.contains(&2));
}

#[test]
fn test_sync_no_eviction_if_at_budget() {
  let cache = build_test_cache(50, 0);
  for key in 0..5 {
    cache.insert(key, blob(key, 10));
  }
  assert_eq!(cache.stats().total_size_in_bytes, 50);
  assert_eq!(cache.len(), 5);
  assert_eq!(cache.metrics().evicted_by_capacity, 0);
}

#[test]
fn test_sync_oversized_value_is_admitted() {
  let cache = build_test_cache(100, 0);
  cache.insert(1, blob(1, 30));
  cache.insert(2, blob(2, 30));

  cache.insert(3, blob(3, 1_000));

  assert!(cache.contains(&3), "a value larger than the budget is still admitted");
  assert!(!cache.contains(&1));
  assert!(!cache.contains(&2));
  assert_eq!(cache.stats().total_size_in_bytes, 1_000);
  assert_eq!(cache.metrics().oversized_admissions, 1);

  // The next insert evicts the oversized entry like any other.
  cache.insert(4, blob(4, 10));
  assert!(!cache.contains(&3));
  assert_eq!(cache.stats().total_size_in_bytes, 10);
}

#[test]
fn test_sync_minimum_items_floor_holds_over_budget() {
  let cache = build_test_cache(10, 4);
  for key in 0..20 {
    cache.insert(key, blob(key, 100));
    let stats = cache.stats();
    assert!(
      stats.object_count <= 4,
      "eviction must bring the cache down to the floor"
    );
    assert_eq!(stats.object_count, (key + 1).min(4));
  }

  // The floor keeps the four most recent entries despite 400 bytes > 10.
  assert_eq!(cache.stats().total_size_in_bytes, 400);
  for key in 16..20 {
    assert!(cache.contains(&key), "key {} should still be present", key);
  }
}

#[test]
fn test_sync_floor_of_one_never_empties() {
  let budget = 1_000;
  let n = 10u64;
  let cache = build_test_cache(budget, 1);

  for key in 0..n {
    // Each item exceeds budget / n.
    cache.insert(key, blob(key, budget / n + 50));
    assert!(cache.len() >= 1, "the cache must never be empty after an insert");
    assert!(cache.contains(&key), "the newest insert is always retained");
  }
}

#[test]
fn test_sync_eviction_terminates_at_budget_not_before() {
  let cache = build_test_cache(100, 0);
  for key in 0..10 {
    cache.insert(key, blob(key, 10));
  }
  // 100 bytes. A 25 byte insert needs three 10 byte evictions, not more.
  cache.insert(10, blob(10, 25));

  let stats = cache.stats();
  assert_eq!(stats.total_size_in_bytes, 95);
  assert_eq!(stats.object_count, 8);
  assert_eq!(cache.metrics().evicted_by_capacity, 3);
  for key in 0..3 {
    assert!(!cache.contains(&key));
  }
}

#[test]
fn test_sync_growing_replacement_evicts_others() {
  let cache = build_test_cache(30, 0);
  cache.insert(1, blob(1, 10));
  cache.insert(2, blob(2, 10));
  cache.insert(3, blob(3, 10));

  // Replacing 3 with a larger value pushes the cache over budget.
  cache.insert(3, blob(33, 25));

  assert_eq!(cache.get(&3).unwrap().tag, 33);
  assert!(!cache.contains(&1));
  assert!(!cache.contains(&2));
  assert_eq!(cache.stats().total_size_in_bytes, 25);
}

#[test]
fn test_sync_limits_change_applies_on_next_insert() {
  let cache = build_test_cache(1_000, 0);
  for key in 0..10 {
    cache.insert(key, blob(key, 50));
  }
  assert_eq!(cache.stats().total_size_in_bytes, 500);

  cache.set_limits(CacheLimits {
    byte_budget: 200,
    minimum_items: 0,
  });
  assert_eq!(
    cache.stats().total_size_in_bytes,
    500,
    "no entries are migrated when limits change"
  );

  cache.insert(10, blob(10, 50));
  let stats = cache.stats();
  assert_eq!(stats.total_size_in_bytes, 200);
  assert_eq!(stats.object_count, 4);
  for key in 7..=10 {
    assert!(cache.contains(&key));
  }
}

#[test]
fn test_sync_totals_match_live_entries() {
  let cache = build_test_cache(300, 2);
  for key in 0..50u64 {
    cache.insert(key % 17, blob(key, 10 + (key * 7) % 40));
    if key % 3 == 0 {
      cache.get(&(key / 2));
    }

    let stats = cache.stats();
    let (bytes, items) = live_totals(&cache, 0..17);
    assert_eq!(stats.total_size_in_bytes, bytes);
    assert_eq!(stats.object_count, items);
  }
}

#[test]
fn test_sync_huge_size_does_not_panic() {
  let cache = build_test_cache(100, 0);
  cache.insert_with_size(1, blob(1, 0), u64::MAX);
  cache.insert_with_size(2, blob(2, 0), 1);

  // The huge entry is the only victim and the total is exact again.
  assert!(!cache.contains(&1));
  assert!(cache.contains(&2));
  let stats = cache.stats();
  assert_eq!(stats.total_size_in_bytes, 1);
  assert_eq!(stats.object_count, 1);
}

#[test]
fn test_sync_total_saturates_when_floor_keeps_huge_entries() {
  let cache = build_test_cache(100, 2);
  cache.insert_with_size(1, blob(1, 0), u64::MAX);
  cache.insert_with_size(2, blob(2, 0), u64::MAX);

  let stats = cache.stats();
  assert_eq!(stats.object_count, 2);
  assert_eq!(stats.total_size_in_bytes, u64::MAX);

  cache.invalidate(&1);
  assert_eq!(cache.stats().total_size_in_bytes, u64::MAX);
  cache.invalidate(&2);
  assert_eq!(cache.stats().total_size_in_bytes, 0);
}

#[test]
fn test_sync_zero_budget_keeps_the_floor() {
  let cache = build_test_cache(0, 2);
  for key in 0..5 {
    cache.insert(key, blob(key, 10));
  }

  assert_eq!(cache.len(), 2);
  assert!(cache.contains(&3) && cache.contains(&4));
}
