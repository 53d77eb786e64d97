use fibre_object_cache::{
  CacheSettings, EvictionListener, EvictionReason, GaugeRegistry, ObjectCacheBuilder, ObjectId,
  ReloadableConfig, Tree, TreeCache, TreeEntry, TreeEntryKind,
};
use std::sync::Arc;

// A simple listener that just prints evicted trees.
struct PrintingListener;

impl EvictionListener<ObjectId, Tree> for PrintingListener {
  fn on_evict(&self, key: ObjectId, value: Arc<Tree>, reason: EvictionReason) {
    println!(
      "[Listener] Tree evicted! Id: {}, Entries: {}, Reason: {}",
      key,
      value.len(),
      reason
    );
  }
}

fn make_tree(byte: u8, children: usize) -> (ObjectId, Arc<Tree>) {
  let id = ObjectId::from_bytes([byte; 20]);
  let entries = (0..children)
    .map(|i| TreeEntry::new(format!("entry_{i}"), id, TreeEntryKind::RegularFile))
    .collect();
  (id, Arc::new(Tree::new(id, entries)))
}

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .init();

  println!("--- Object cache with an eviction listener ---");
  let cache = ObjectCacheBuilder::default()
    .byte_budget(2_000)
    .minimum_items(1)
    .eviction_listener(PrintingListener)
    .build();

  for byte in 0..6u8 {
    let (id, tree) = make_tree(byte, 4);
    cache.insert(id, tree);
  }
  println!("Stats: {:?}", cache.stats());

  println!("\n--- Tree cache driven by live settings ---");
  let config = Arc::new(ReloadableConfig::new(CacheSettings {
    enabled: true,
    byte_budget: 4_096,
    minimum_items: 2,
  }));
  let registry = Arc::new(GaugeRegistry::new());
  let trees = TreeCache::new(config.clone(), registry.clone());

  for byte in 0..8u8 {
    let (id, tree) = make_tree(byte, 8);
    trees.insert(id, tree);
  }
  println!("Gauges: {:?}", registry.snapshot());

  let (last, _) = make_tree(7, 0);
  config.set_enabled(false);
  println!("Lookup while disabled: {:?}", trees.get(&last).map(|t| t.id()));

  config.set_enabled(true);
  println!("Lookup after re-enabling: {:?}", trees.get(&last).map(|t| t.id()));

  drop(trees);
  println!("Gauges after drop: {:?}", registry.snapshot());
}
