use fibre_object_cache::{ObjectCacheBuilder, ObjectSize};
use std::sync::Arc;

fn main() {
  // 1 KiB budget, but the two most recent entries always stay.
  let cache = ObjectCacheBuilder::default()
    .byte_budget(1024)
    .minimum_items(2)
    .build();

  let value = Arc::new(vec![7u8; 300]);
  println!("Inserting 'key1' ({} bytes) into the cache.", value.size_in_bytes());
  cache.insert("key1".to_string(), value);

  match cache.get("key1") {
    Some(value) => println!("Found value for key1: {} bytes", value.len()),
    None => println!("Value for key1 not found."),
  }

  // Three more values push the cache over its budget.
  for key in ["key2", "key3", "key4"] {
    cache.insert(key.to_string(), Arc::new(vec![0u8; 300]));
  }

  match cache.get("key1") {
    Some(_) => println!("key1 is still cached."),
    None => println!("key1 was evicted as the least recently used entry."),
  }

  println!("\nCache stats: {:?}", cache.stats());
  println!("\nCache metrics: {:#?}", cache.metrics());
}
