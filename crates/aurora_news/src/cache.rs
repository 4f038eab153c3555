use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

struct CacheState<K, V> {
    entries: HashMap<K, Entry<V>>,
    generation: u64,
}

/// TTL cache for read responses, keyed by the full request value.
///
/// Every invalidation bumps a generation counter. A reader takes the
/// generation before going to the store and hands it back on insert; if an
/// invalidation happened in between, the fill is dropped so a stale page
/// never outlives the refresh that made it stale.
pub struct ResponseCache<K, V> {
    ttl: Duration,
    state: Mutex<CacheState<K, V>>,
}

impl<K: Eq + Hash, V: Clone> ResponseCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                generation: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut state = self.state();
        let fresh = state.entries.get(key).map(|entry| entry.expires_at > now);
        match fresh {
            Some(true) => state.entries.get(key).map(|entry| entry.value.clone()),
            Some(false) => {
                state.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    /// Store `value` unless the cache was invalidated since `generation` was read.
    pub fn insert_if_current(&self, key: K, value: V, generation: u64) -> bool {
        let mut state = self.state();
        if state.generation != generation {
            return false;
        }
        let expires_at = Instant::now() + self.ttl;
        state.entries.insert(key, Entry { value, expires_at });
        true
    }

    /// Drop every entry. Returns how many were dropped.
    pub fn invalidate_all(&self) -> usize {
        let mut state = self.state();
        state.generation += 1;
        let dropped = state.entries.len();
        state.entries.clear();
        dropped
    }

    /// Entries that have not yet expired.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state();
        state.entries.retain(|_, entry| entry.expires_at > now);
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
