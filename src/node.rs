use crate::edge::Edge;
use crate::types::Level;
use crate::utils::pairing3;

/// End of a hash chain.
pub(crate) const NIL: u32 = u32::MAX;

const GC_MARK: u8 = 0b01;
const SCAN_MARK: u8 = 0b10;

/// A decision node: `level ? then : else`.
///
/// The stored else edge is never complemented; the complement of a whole
/// function lives on the edge that points at the node.
#[derive(Debug, Copy, Clone)]
pub struct Node {
    pub level: Level,
    pub e0: Edge,
    pub e1: Edge,
    pub(crate) root_count: u32,
    pub(crate) link: u32,
    pub(crate) marks: u8,
}

impl Node {
    pub(crate) fn new(level: Level, e0: Edge, e1: Edge) -> Self {
        debug_assert!(!e0.is_complemented(), "else edge must be regular");
        Self {
            level,
            e0,
            e1,
            root_count: 0,
            link: NIL,
            marks: 0,
        }
    }

    /// An empty arena slot.
    pub(crate) fn free() -> Self {
        Self {
            level: Level::TERMINAL,
            e0: Edge::Zero,
            e1: Edge::Zero,
            root_count: 0,
            link: NIL,
            marks: 0,
        }
    }

    pub fn is_free(&self) -> bool {
        self.level.is_terminal()
    }

    /// Number of root handles pointing at this node.
    pub fn root_count(&self) -> u32 {
        self.root_count
    }

    /// Saturates at `u32::MAX`; a saturated node stays pinned.
    pub(crate) fn inc_root(&mut self) {
        if self.root_count != u32::MAX {
            self.root_count += 1;
        }
    }

    pub(crate) fn dec_root(&mut self) {
        if self.root_count != u32::MAX && self.root_count > 0 {
            self.root_count -= 1;
        }
    }

    pub(crate) fn gc_mark(&self) -> bool {
        self.marks & GC_MARK != 0
    }

    pub(crate) fn set_gc_mark(&mut self, on: bool) {
        if on {
            self.marks |= GC_MARK;
        } else {
            self.marks &= !GC_MARK;
        }
    }

    pub(crate) fn scan_mark(&self) -> bool {
        self.marks & SCAN_MARK != 0
    }

    pub(crate) fn set_scan_mark(&mut self, on: bool) {
        if on {
            self.marks |= SCAN_MARK;
        } else {
            self.marks &= !SCAN_MARK;
        }
    }
}

/// Hash of a `(level, else, then)` triple.
pub(crate) fn node_hash(level: Level, e0: Edge, e1: Edge) -> u64 {
    pairing3(level.index() as u64, e0.raw(), e1.raw())
}
