//! Unique table: the node arena plus the hash chains that make every
//! `(level, else, then)` triple appear at most once.
//!
//! Node slots are never moved. Freed slots go on a free list and are reused
//! before the arena grows, so a [`NodeId`] stays valid for as long as its node
//! is alive, across resizes and collections.

use std::mem::size_of;

use log::{debug, info};

use crate::edge::{Edge, NodeId};
use crate::node::{node_hash, Node, NIL};
use crate::types::Level;
use crate::utils::mix64;

pub struct NodeTable {
    nodes: Vec<Node>,
    buckets: Vec<u32>,
    bitmask: u64,
    /// Recycled slots (stack).
    free: Vec<u32>,
    /// Number of live nodes.
    live: usize,
    min_buckets: usize,
    load_limit: f64,
    max_nodes: usize,
    resizes: usize,
}

impl NodeTable {
    /// Creates a table with `initial_size` buckets (a power of two).
    pub fn new(initial_size: usize, max_nodes: usize, load_limit: f64) -> Self {
        assert!(initial_size.is_power_of_two(), "Bucket count must be a power of two");
        Self {
            nodes: Vec::new(),
            buckets: vec![NIL; initial_size],
            bitmask: (initial_size - 1) as u64,
            free: Vec::new(),
            live: 0,
            min_buckets: initial_size,
            load_limit,
            max_nodes,
            resizes: 0,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of free slots ready for reuse.
    pub fn avail(&self) -> usize {
        self.free.len()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Changes the node limit. Nodes already allocated beyond it stay.
    pub(crate) fn set_max_nodes(&mut self, max_nodes: usize) {
        self.max_nodes = max_nodes;
    }

    /// Changes the load limit; the next insertion resizes if it is exceeded.
    pub(crate) fn set_load_limit(&mut self, load_limit: f64) {
        self.load_limit = load_limit;
    }

    /// Number of bucket resizes so far (grow or shrink).
    pub fn resize_count(&self) -> usize {
        self.resizes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Checks whether `id` is a live node.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(|n| !n.is_free())
    }

    /// Level of the node an edge points at; terminals are below every level.
    pub fn level_of(&self, e: Edge) -> Level {
        match e {
            Edge::Node(id, _) => self.nodes[id.index()].level,
            _ => Level::TERMINAL,
        }
    }

    /// Cofactors of `e` with respect to `level`.
    ///
    /// If `e` does not start at `level`, both cofactors are `e` itself.
    pub fn cofactors(&self, e: Edge, level: Level) -> (Edge, Edge) {
        match e {
            Edge::Node(id, c) => {
                let node = &self.nodes[id.index()];
                if node.level == level {
                    (node.e0.negate_if(c), node.e1.negate_if(c))
                } else {
                    (e, e)
                }
            }
            _ => (e, e),
        }
    }

    /// Iterates over live nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_free())
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    fn bucket_index(&self, level: Level, e0: Edge, e1: Edge) -> usize {
        (mix64(node_hash(level, e0, e1)) & self.bitmask) as usize
    }

    /// Returns the canonical edge for `level ? e1 : e0`.
    pub fn get_or_create(&mut self, level: Level, e0: Edge, e1: Edge) -> Edge {
        if e0.is_error() || e1.is_error() {
            return Edge::Error;
        }
        if e0.is_overflow() || e1.is_overflow() {
            return Edge::Overflow;
        }
        if e0 == e1 {
            return e0;
        }
        debug_assert!(level < self.level_of(e0) && level < self.level_of(e1));

        let (e0, neg) = e0.normalize();
        let e1 = e1.negate_if(neg);

        let bucket = self.bucket_index(level, e0, e1);
        let mut index = self.buckets[bucket];
        while index != NIL {
            let node = &self.nodes[index as usize];
            if node.level == level && node.e0 == e0 && node.e1 == e1 {
                return Edge::node(NodeId::new(index), neg);
            }
            index = node.link;
        }

        let Some(index) = self.alloc() else {
            return Edge::Overflow;
        };
        let node = &mut self.nodes[index as usize];
        *node = Node::new(level, e0, e1);
        node.link = self.buckets[bucket];
        self.buckets[bucket] = index;
        self.live += 1;

        if self.live as f64 > self.buckets.len() as f64 * self.load_limit {
            self.resize(self.buckets.len() * 2);
        }

        Edge::node(NodeId::new(index), neg)
    }

    fn alloc(&mut self) -> Option<u32> {
        if let Some(index) = self.free.pop() {
            return Some(index);
        }
        if self.nodes.len() >= self.max_nodes || self.nodes.try_reserve(1).is_err() {
            return None;
        }
        self.nodes.push(Node::free());
        Some((self.nodes.len() - 1) as u32)
    }

    /// Makes room for `count` new nodes: arena memory, and enough buckets that
    /// inserting them does not resize. Returns `false` if they would overflow.
    pub(crate) fn reserve(&mut self, count: usize) -> bool {
        let extra = count.saturating_sub(self.free.len());
        if self.nodes.len() + extra > self.max_nodes || self.nodes.try_reserve(extra).is_err() {
            return false;
        }
        let mut size = self.buckets.len();
        while (self.live + count) as f64 > size as f64 * self.load_limit {
            size *= 2;
        }
        size == self.buckets.len() || self.resize(size)
    }

    /// Rehashes every live node into `new_size` buckets.
    ///
    /// Returns `false`, leaving the table as it was, if the buckets cannot be allocated.
    fn resize(&mut self, new_size: usize) -> bool {
        let mut buckets = Vec::new();
        if buckets.try_reserve_exact(new_size).is_err() {
            debug!("Could not allocate {} buckets, keeping {}", new_size, self.buckets.len());
            return false;
        }
        buckets.resize(new_size, NIL);
        info!(
            "Resizing unique table: {} -> {} buckets ({} nodes)",
            self.buckets.len(),
            new_size,
            self.live
        );
        self.buckets = buckets;
        self.bitmask = (new_size - 1) as u64;
        for index in 0..self.nodes.len() {
            if !self.nodes[index].is_free() {
                self.link(index as u32);
            }
        }
        self.resizes += 1;
        true
    }

    /// Halves the bucket array while the load stays under the limit.
    ///
    /// Returns `true` if the table was resized.
    pub fn shrink(&mut self) -> bool {
        let mut size = self.buckets.len();
        while size > self.min_buckets && (self.live as f64 * 2.0 / self.load_limit) < (size / 2) as f64 {
            size /= 2;
        }
        size != self.buckets.len() && self.resize(size)
    }

    /// Inserts a node into its hash chain.
    pub(crate) fn link(&mut self, index: u32) {
        let node = &self.nodes[index as usize];
        let bucket = self.bucket_index(node.level, node.e0, node.e1);
        self.nodes[index as usize].link = self.buckets[bucket];
        self.buckets[bucket] = index;
    }

    /// Removes a node from its hash chain. The slot stays allocated.
    pub(crate) fn unlink(&mut self, index: u32) {
        let node = &self.nodes[index as usize];
        let bucket = self.bucket_index(node.level, node.e0, node.e1);
        let next = node.link;
        if self.buckets[bucket] == index {
            self.buckets[bucket] = next;
        } else {
            let mut cur = self.buckets[bucket];
            while cur != NIL {
                let link = self.nodes[cur as usize].link;
                if link == index {
                    self.nodes[cur as usize].link = next;
                    break;
                }
                cur = link;
            }
        }
        self.nodes[index as usize].link = NIL;
    }

    /// Sets the GC mark on every node reachable from `root`.
    pub(crate) fn mark_from(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.index()];
            if node.gc_mark() {
                continue;
            }
            node.set_gc_mark(true);
            let (e0, e1) = (node.e0, node.e1);
            stack.extend(e0.node_id());
            stack.extend(e1.node_id());
        }
    }

    /// Frees every unmarked node and clears the marks of the survivors.
    ///
    /// Returns the number of freed nodes.
    pub(crate) fn sweep(&mut self) -> usize {
        let mut freed = 0;
        for bucket in 0..self.buckets.len() {
            let mut prev = NIL;
            let mut index = self.buckets[bucket];
            while index != NIL {
                let node = &mut self.nodes[index as usize];
                let next = node.link;
                if node.gc_mark() {
                    node.set_gc_mark(false);
                    prev = index;
                } else {
                    *node = Node::free();
                    if prev == NIL {
                        self.buckets[bucket] = next;
                    } else {
                        self.nodes[prev as usize].link = next;
                    }
                    self.free.push(index);
                    freed += 1;
                }
                index = next;
            }
        }
        self.live -= freed;
        freed
    }

    /// Counts nodes reachable from `roots`, using the scan mark.
    pub(crate) fn count_reachable(&mut self, roots: &[NodeId]) -> usize {
        let visited = self.scan(roots);
        for &id in &visited {
            self.nodes[id.index()].set_scan_mark(false);
        }
        visited.len()
    }

    /// Returns every node reachable from `roots`, each once, with scan marks set.
    ///
    /// The caller is responsible for clearing the marks.
    pub(crate) fn scan(&mut self, roots: &[NodeId]) -> Vec<NodeId> {
        let mut visited = Vec::new();
        let mut stack = roots.to_vec();
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.index()];
            if node.scan_mark() {
                continue;
            }
            node.set_scan_mark(true);
            visited.push(id);
            let (e0, e1) = (node.e0, node.e1);
            stack.extend(e0.node_id());
            stack.extend(e1.node_id());
        }
        visited
    }

    /// Bytes held by the arena, buckets and free list.
    pub fn used_mem(&self) -> usize {
        self.nodes.capacity() * size_of::<Node>()
            + self.buckets.capacity() * size_of::<u32>()
            + self.free.capacity() * size_of::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn table() -> NodeTable {
        NodeTable::new(16, 1000, 2.0)
    }

    #[test]
    fn test_get_or_create_is_unique() {
        let mut table = table();
        let x = table.get_or_create(Level::new(1), Edge::Zero, Edge::One);
        let y = table.get_or_create(Level::new(1), Edge::Zero, Edge::One);
        assert_eq!(x, y);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_reduction_rule() {
        let mut table = table();
        let x = table.get_or_create(Level::new(1), Edge::Zero, Edge::One);
        assert_eq!(table.get_or_create(Level::new(0), x, x), x);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_complement_normalization() {
        let mut table = table();
        let x = table.get_or_create(Level::new(0), Edge::Zero, Edge::One);
        let not_x = table.get_or_create(Level::new(0), Edge::One, Edge::Zero);
        assert_eq!(not_x, -x);
        assert_eq!(table.len(), 1);
        let id = x.node_id().unwrap();
        assert!(!table.node(id).e0.is_complemented());
    }

    #[test]
    fn test_sentinels_propagate() {
        let mut table = table();
        assert_eq!(table.get_or_create(Level::new(0), Edge::Overflow, Edge::Error), Edge::Error);
        assert_eq!(table.get_or_create(Level::new(0), Edge::Zero, Edge::Overflow), Edge::Overflow);
        assert!(table.is_empty());
    }

    #[test]
    fn test_overflow_at_max_nodes() {
        let mut table = NodeTable::new(16, 2, 2.0);
        let a = table.get_or_create(Level::new(2), Edge::Zero, Edge::One);
        let b = table.get_or_create(Level::new(1), Edge::Zero, Edge::One);
        assert!(a.is_node() && b.is_node());
        let c = table.get_or_create(Level::new(0), Edge::Zero, Edge::One);
        assert_eq!(c, Edge::Overflow);
        assert_eq!(table.len(), 2);
        // Existing triples are still found.
        assert_eq!(table.get_or_create(Level::new(1), Edge::Zero, Edge::One), b);
    }

    #[test]
    fn test_reserve() {
        let mut table = NodeTable::new(16, 40, 1.0);
        assert!(table.reserve(40));
        assert!(!table.reserve(41));
        assert_eq!(table.bucket_count(), 64);
        let resizes = table.resize_count();
        for i in 0..40 {
            table.get_or_create(Level::new(i), Edge::Zero, Edge::One);
        }
        assert_eq!(table.resize_count(), resizes);
    }

    #[test]
    fn test_reserve_fails_without_buckets() {
        // The load limit asks for more buckets than can ever be allocated.
        let mut table = NodeTable::new(16, usize::MAX, 1e-18);
        let x = table.get_or_create(Level::new(0), Edge::Zero, Edge::One);
        let buckets = table.bucket_count();
        assert!(!table.reserve(4));
        assert_eq!(table.bucket_count(), buckets);
        assert_eq!(table.get_or_create(Level::new(0), Edge::Zero, Edge::One), x);
    }

    #[test]
    fn test_resize_keeps_ids() {
        let mut table = table();
        let edges: Vec<Edge> = (0..100)
            .map(|i| table.get_or_create(Level::new(i), Edge::Zero, Edge::One))
            .collect();
        assert!(table.bucket_count() > 16);
        assert!(table.resize_count() > 0);
        for (i, &e) in edges.iter().enumerate() {
            assert_eq!(table.get_or_create(Level::new(i as u32), Edge::Zero, Edge::One), e);
        }
        assert_eq!(table.len(), 100);
    }

    #[test]
    fn test_sweep_reuses_slots() {
        let mut table = table();
        let x = table.get_or_create(Level::new(1), Edge::Zero, Edge::One);
        let y = table.get_or_create(Level::new(0), Edge::Zero, x);
        let z = table.get_or_create(Level::new(2), Edge::Zero, Edge::One);
        table.mark_from(y.node_id().unwrap());
        assert_eq!(table.sweep(), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.avail(), 1);
        assert!(!table.is_live(z.node_id().unwrap()));
        assert!(table.is_live(x.node_id().unwrap()));

        let w = table.get_or_create(Level::new(3), Edge::Zero, Edge::One);
        assert_eq!(w.node_id(), z.node_id());
        assert_eq!(table.avail(), 0);
    }

    #[test]
    fn test_unlink_link() {
        let mut table = table();
        let x = table.get_or_create(Level::new(1), Edge::Zero, Edge::One);
        let id = x.node_id().unwrap();
        table.unlink(id.raw());
        table.node_mut(id).level = Level::new(4);
        table.link(id.raw());
        assert_eq!(table.get_or_create(Level::new(4), Edge::Zero, Edge::One), x);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_count_reachable_clears_marks() {
        let mut table = table();
        let x = table.get_or_create(Level::new(1), Edge::Zero, Edge::One);
        let y = table.get_or_create(Level::new(0), x, -x);
        let roots = [y.node_id().unwrap()];
        assert_eq!(table.count_reachable(&roots), 2);
        assert_eq!(table.count_reachable(&roots), 2);
    }

    #[test]
    fn test_shrink() {
        let mut table = table();
        for i in 0..100 {
            table.get_or_create(Level::new(i), Edge::Zero, Edge::One);
        }
        let grown = table.bucket_count();
        assert_eq!(table.sweep(), 100);
        assert!(table.shrink());
        assert!(table.bucket_count() < grown);
        assert_eq!(table.bucket_count(), 16);
    }
}
