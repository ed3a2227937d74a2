//! Sharded key-value map.
//!
//! Entries for one key always land in the same shard, so holding that
//! shard's lock makes a check-then-mutate sequence atomic for the key.
//! Different keys mostly hit different shards and proceed independently;
//! there is no global lock.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use tokio::sync::{Mutex, MutexGuard};

const SHARD_COUNT: usize = 16;

pub(crate) struct ShardedMap<V> {
    shards: Vec<Mutex<HashMap<String, V>>>,
}

impl<V> ShardedMap<V> {
    pub(crate) fn new() -> Self {
        let shards = (0..SHARD_COUNT)
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    /// Lock the shard owning `key`. The guard covers every key in the shard;
    /// callers keep critical sections short and never await while holding it.
    pub(crate) async fn lock(&self, key: &str) -> MutexGuard<'_, HashMap<String, V>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % SHARD_COUNT;
        self.shards[idx].lock().await
    }

    /// Visit every shard in turn, e.g. for background sweeps.
    pub(crate) async fn for_each_shard<F>(&self, mut f: F)
    where
        F: FnMut(&mut HashMap<String, V>),
    {
        for shard in &self.shards {
            let mut guard = shard.lock().await;
            f(&mut guard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_same_shard() {
        let map: ShardedMap<u32> = ShardedMap::new();
        map.lock("alpha").await.insert("alpha".into(), 1);
        assert_eq!(map.lock("alpha").await.get("alpha"), Some(&1));
    }

    #[tokio::test]
    async fn for_each_shard_sees_all_entries() {
        let map: ShardedMap<u32> = ShardedMap::new();
        for i in 0..100u32 {
            let key = format!("key-{i}");
            map.lock(&key).await.insert(key.clone(), i);
        }
        let mut total = 0;
        map.for_each_shard(|shard| total += shard.len()).await;
        assert_eq!(total, 100);
    }
}
