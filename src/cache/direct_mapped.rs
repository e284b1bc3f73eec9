//! Direct-mapped cache with generation-based O(1) clearing.
//!
//! Each key hashes to exactly one slot and a colliding insert overwrites the
//! previous entry. Every entry is stamped with the generation it was written
//! in; `clear()` bumps the generation, so all older entries read as empty.
//! Clearing happens on every collection, table resize and level swap, which
//! is why it must not touch memory.

use std::cell::Cell;

use crate::utils::{mix64, MyHash};

/// Default cache size in bits. 2^14 = 16K entries.
pub const DEFAULT_CACHE_BITS: usize = 14;

#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    generation: u64,
}

/// A direct-mapped cache with O(1) clearing via generation counters.
pub struct DirectMappedCache<K, V> {
    entries: Vec<Entry<K, V>>,
    bitmask: u64,
    generation: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
    faults: Cell<usize>,
}

impl<K: Default, V: Default> Default for DirectMappedCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_BITS)
    }
}

impl<K, V> DirectMappedCache<K, V>
where
    K: Default,
    V: Default,
{
    /// Creates a new cache with `2^bits` slots.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 30, "Cache bits must be in range 0..=30, got {}", bits);

        let size = 1usize << bits;
        Self {
            entries: (0..size)
                .map(|_| Entry {
                    key: K::default(),
                    value: V::default(),
                    generation: 0,
                })
                .collect(),
            bitmask: (size - 1) as u64,
            // Start at 1 so default entries are invalid.
            generation: 1,
            hits: Cell::new(0),
            misses: Cell::new(0),
            faults: Cell::new(0),
        }
    }
}

impl<K, V> DirectMappedCache<K, V> {
    /// Returns the number of slots in the cache.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    /// Returns the number of misses caused by a slot holding another key.
    pub fn faults(&self) -> usize {
        self.faults.get()
    }

    /// Clears the cache in O(1) time.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1).max(1);
    }

    pub fn used_mem(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<Entry<K, V>>()
    }
}

impl<K, V> DirectMappedCache<K, V>
where
    K: MyHash + Eq,
    V: Copy,
{
    #[inline]
    fn index(&self, key: &K) -> usize {
        (mix64(key.hash()) & self.bitmask) as usize
    }

    /// Looks up a key in the cache.
    #[inline]
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = &self.entries[self.index(key)];
        if entry.generation != self.generation {
            self.misses.set(self.misses.get() + 1);
            return None;
        }
        if entry.key == *key {
            self.hits.set(self.hits.get() + 1);
            Some(entry.value)
        } else {
            self.misses.set(self.misses.get() + 1);
            self.faults.set(self.faults.get() + 1);
            None
        }
    }

    /// Inserts a key-value pair, overwriting whatever the slot held.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        let idx = self.index(&key);
        self.entries[idx] = Entry {
            key,
            value,
            generation: self.generation,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::pairing2;

    impl MyHash for (u64, u64) {
        fn hash(&self) -> u64 {
            pairing2(self.0, self.1)
        }
    }

    #[test]
    fn test_insert_get() {
        let mut cache = DirectMappedCache::<(u64, u64), i32>::new(4);

        cache.insert((1, 2), 42);
        assert_eq!(cache.get(&(1, 2)), Some(42));
        assert_eq!(cache.get(&(5, 6)), None);
    }

    #[test]
    fn test_overwrite() {
        let mut cache = DirectMappedCache::<(u64, u64), i32>::new(4);

        cache.insert((1, 2), 10);
        cache.insert((1, 2), 20);
        assert_eq!(cache.get(&(1, 2)), Some(20));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut cache = DirectMappedCache::<(u64, u64), i32>::new(4);

        for i in 0..10 {
            cache.insert((i, i + 1), i as i32);
            assert_eq!(cache.get(&(i, i + 1)), Some(i as i32));
            cache.clear();
            assert_eq!(cache.get(&(i, i + 1)), None);
        }
    }

    #[test]
    fn test_collision_overwrites() {
        // 4 slots
        let mut cache = DirectMappedCache::<(u64, u64), i32>::new(2);

        for i in 0..16 {
            cache.insert((i, 0), i as i32);
        }
        let found = (0..16).filter(|&i| cache.get(&(i, 0)).is_some()).count();
        assert!(found <= 4);
        assert!(cache.faults() > 0);
    }

    #[test]
    fn test_statistics() {
        let mut cache = DirectMappedCache::<(u64, u64), i32>::new(4);

        cache.get(&(1, 2));
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 0);

        cache.insert((1, 2), 42);
        cache.get(&(1, 2));
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_default_key_is_not_a_hit() {
        let cache = DirectMappedCache::<(u64, u64), i32>::new(4);
        assert_eq!(cache.get(&(0, 0)), None);
    }
}
