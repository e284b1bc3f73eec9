//! Computed-operation caches.
//!
//! | Cache | Key | Used by |
//! |-------|-----|---------|
//! | binary | [`Key2`] `{ op, f, g }` | AND, XOR, implication, cofactor |
//! | ternary | [`Key3`] `{ op, f, g, h }` | ITE |
//! | compose | [`Edge`] | compose (valid until the next `compose_start`) |
//!
//! All caches are [`DirectMappedCache`]s: fixed size, overwrite on collision,
//! O(1) clear. A cache may forget any entry at any time, it never returns a
//! wrong one. Entries are only valid while every edge in them is alive, so
//! all caches are cleared whenever nodes are freed or rearranged.

mod direct_mapped;

pub use direct_mapped::{DirectMappedCache, DEFAULT_CACHE_BITS};

use crate::edge::Edge;
use crate::utils::{pairing3, pairing4, MyHash};

/// Operation tag of a cache entry.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Op {
    #[default]
    And,
    Xor,
    Ite,
    Implies,
    Cofactor {
        level: u32,
        pol: bool,
    },
}

impl Op {
    fn code(self) -> u64 {
        match self {
            Op::And => 0,
            Op::Xor => 1,
            Op::Ite => 2,
            Op::Implies => 3,
            Op::Cofactor { level, pol } => 4 + (((level as u64) << 1) | pol as u64),
        }
    }
}

/// Key of the binary cache.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Key2 {
    pub op: Op,
    pub f: Edge,
    pub g: Edge,
}

impl MyHash for Key2 {
    fn hash(&self) -> u64 {
        pairing3(self.op.code(), self.f.raw(), self.g.raw())
    }
}

/// Key of the ternary cache.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Key3 {
    pub op: Op,
    pub f: Edge,
    pub g: Edge,
    pub h: Edge,
}

impl MyHash for Key3 {
    fn hash(&self) -> u64 {
        pairing4(self.op.code(), self.f.raw(), self.g.raw(), self.h.raw())
    }
}

/// Aggregated counters of all operation caches.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub faults: usize,
    /// Total number of slots.
    pub capacity: usize,
}

impl CacheStats {
    pub(crate) fn add<K, V>(mut self, cache: &DirectMappedCache<K, V>) -> Self {
        self.hits += cache.hits();
        self.misses += cache.misses();
        self.faults += cache.faults();
        self.capacity += cache.capacity();
        self
    }

    /// Fraction of lookups that hit, or 0 if there were none.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::NodeId;

    #[test]
    fn test_keys_with_different_ops_do_not_alias() {
        let mut cache = DirectMappedCache::<Key2, Edge>::new(10);
        let f = Edge::node(NodeId::new(1), false);
        let g = Edge::node(NodeId::new(2), true);
        cache.insert(Key2 { op: Op::And, f, g }, Edge::One);
        assert_eq!(cache.get(&Key2 { op: Op::Xor, f, g }), None);
        assert_eq!(cache.get(&Key2 { op: Op::And, f, g }), Some(Edge::One));
    }

    #[test]
    fn test_cofactor_codes_differ_by_polarity() {
        let pos = Op::Cofactor { level: 4, pol: true };
        let neg = Op::Cofactor { level: 4, pol: false };
        assert_ne!(pos.code(), neg.code());
        assert!(pos.code() > Op::Ite.code());
    }

    #[test]
    fn test_stats_hit_rate() {
        let mut cache = DirectMappedCache::<Key3, Edge>::new(4);
        let key = Key3 {
            op: Op::Ite,
            f: Edge::One,
            g: Edge::Zero,
            h: Edge::One,
        };
        cache.get(&key);
        cache.insert(key, Edge::Zero);
        cache.get(&key);
        let stats = CacheStats::default().add(&cache);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
        assert_eq!(stats.capacity, 16);
    }
}
