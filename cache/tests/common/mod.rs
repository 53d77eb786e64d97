#![allow(dead_code)]

use std::sync::Arc;

use fibre_object_cache::{
  ObjectCache, ObjectCacheBuilder, ObjectId, ObjectSize, Tree, TreeEntry, TreeEntryKind,
};

/// A test value whose byte size is chosen by the test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
  pub tag: u64,
  pub size: u64,
}

impl ObjectSize for Blob {
  fn size_in_bytes(&self) -> u64 {
    self.size
  }
}

pub fn blob(tag: u64, size: u64) -> Arc<Blob> {
  Arc::new(Blob { tag, size })
}

// Helper to build a cache for testing purposes.
pub fn build_test_cache(byte_budget: u64, minimum_items: usize) -> ObjectCache<u64, Blob> {
  ObjectCacheBuilder::new()
    .byte_budget(byte_budget)
    .minimum_items(minimum_items)
    .build()
}

/// Builds an object id whose every byte is `byte`.
pub fn oid(byte: u8) -> ObjectId {
  ObjectId::from_bytes([byte; 20])
}

/// Builds a tree with `children` regular files.
pub fn test_tree(byte: u8, children: usize) -> Arc<Tree> {
  let entries = (0..children)
    .map(|i| TreeEntry::new(format!("file_{i:04}"), oid(byte), TreeEntryKind::RegularFile))
    .collect();
  Arc::new(Tree::new(oid(byte), entries))
}

/// Sums the sizes of every live entry among `keys` by peeking at each one,
/// i.e. without relying on the cache's own running totals.
pub fn live_totals(cache: &ObjectCache<u64, Blob>, keys: impl IntoIterator<Item = u64>) -> (u64, u64) {
  let mut bytes = 0;
  let mut items = 0;
  for key in keys {
    if let Some(value) = cache.peek(&key) {
      bytes += value.size;
      items += 1;
    }
  }
  (bytes, items)
}
