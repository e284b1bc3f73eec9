//! Edges: references to BDD nodes with a complement bit.
//!
//! An [`Edge`] is either one of the four terminals or a node slot plus a
//! complement flag. Complementing an edge is O(1) and never touches the
//! node table.
//!
//! # Terminals
//!
//! - [`Edge::Zero`] / [`Edge::One`]: the constant functions, complements of
//!   each other (`One` is treated as the complemented form of `Zero`)
//! - [`Edge::Error`]: the result of an invalid operation (e.g. mixing
//!   managers)
//! - [`Edge::Overflow`]: the result of an operation that ran out of nodes
//!
//! `Error` and `Overflow` are their own complements and absorb through every
//! operation.
//!
//! # Packed form
//!
//! Every edge has a `u64` packed form used for ordering, hashing and
//! serialization:
//!
//! ```text
//! Zero = 0, One = 1, Error = 2, Overflow = 3
//! Node(id, c) = ((id + 2) << 1) | c
//! ```

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Index of a node slot in the manager's arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Largest slot index an edge can address.
    pub const MAX: u32 = u32::MAX >> 2;

    pub const fn new(index: u32) -> Self {
        assert!(index <= Self::MAX, "Node index is too large");
        Self(index)
    }

    /// Return the index of the slot.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A (possibly complemented) reference to a Boolean function.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Edge {
    Zero,
    One,
    #[default]
    Error,
    Overflow,
    /// A node slot and the complement bit.
    Node(NodeId, bool),
}

impl Edge {
    pub const fn zero() -> Self {
        Edge::Zero
    }

    pub const fn one() -> Self {
        Edge::One
    }

    pub const fn error() -> Self {
        Edge::Error
    }

    pub const fn overflow() -> Self {
        Edge::Overflow
    }

    /// Creates an edge pointing at a node.
    pub const fn node(id: NodeId, complemented: bool) -> Self {
        Edge::Node(id, complemented)
    }

    /// Returns the complemented edge.
    ///
    /// Involutive: `e.complement().complement() == e` for every edge.
    pub const fn complement(self) -> Self {
        match self {
            Edge::Zero => Edge::One,
            Edge::One => Edge::Zero,
            Edge::Error => Edge::Error,
            Edge::Overflow => Edge::Overflow,
            Edge::Node(id, c) => Edge::Node(id, !c),
        }
    }

    /// Complements the edge if `neg` is set.
    pub const fn negate_if(self, neg: bool) -> Self {
        if neg {
            self.complement()
        } else {
            self
        }
    }

    pub const fn is_zero(self) -> bool {
        matches!(self, Edge::Zero)
    }

    pub const fn is_one(self) -> bool {
        matches!(self, Edge::One)
    }

    /// Checks whether the edge is `Zero` or `One`.
    pub const fn is_const(self) -> bool {
        matches!(self, Edge::Zero | Edge::One)
    }

    pub const fn is_error(self) -> bool {
        matches!(self, Edge::Error)
    }

    pub const fn is_overflow(self) -> bool {
        matches!(self, Edge::Overflow)
    }

    /// Checks whether the edge is `Error` or `Overflow`.
    pub const fn is_invalid(self) -> bool {
        matches!(self, Edge::Error | Edge::Overflow)
    }

    pub const fn is_node(self) -> bool {
        matches!(self, Edge::Node(..))
    }

    /// Checks whether the edge carries the complement bit.
    ///
    /// `One` counts as the complemented form of `Zero`.
    pub const fn is_complemented(self) -> bool {
        match self {
            Edge::One => true,
            Edge::Node(_, c) => c,
            _ => false,
        }
    }

    /// Returns the target node slot, if any.
    pub const fn node_id(self) -> Option<NodeId> {
        match self {
            Edge::Node(id, _) => Some(id),
            _ => None,
        }
    }

    /// Returns the regular (non-complemented) edge and the stripped polarity.
    pub const fn normalize(self) -> (Self, bool) {
        if self.is_complemented() {
            (self.complement(), true)
        } else {
            (self, false)
        }
    }

    /// Returns the regular form of the edge.
    pub const fn regular(self) -> Self {
        self.normalize().0
    }

    /// Return the packed representation of the edge.
    pub const fn raw(self) -> u64 {
        match self {
            Edge::Zero => 0,
            Edge::One => 1,
            Edge::Error => 2,
            Edge::Overflow => 3,
            Edge::Node(id, c) => ((id.0 as u64 + 2) << 1) | c as u64,
        }
    }

    /// Decodes a packed edge. Returns `None` if the value cannot denote any edge.
    pub fn from_raw(raw: u64) -> Option<Self> {
        match raw {
            0 => Some(Edge::Zero),
            1 => Some(Edge::One),
            2 => Some(Edge::Error),
            3 => Some(Edge::Overflow),
            _ => {
                let index = (raw >> 1) - 2;
                if index > NodeId::MAX as u64 {
                    return None;
                }
                Some(Edge::Node(NodeId(index as u32), raw & 1 != 0))
            }
        }
    }
}

impl Neg for Edge {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.complement()
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw().cmp(&other.raw())
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Zero => write!(f, "0"),
            Edge::One => write!(f, "1"),
            Edge::Error => write!(f, "E"),
            Edge::Overflow => write!(f, "O"),
            Edge::Node(id, c) => write!(f, "{}{}", if *c { "~" } else { "" }, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_involution() {
        let edges = [
            Edge::Zero,
            Edge::One,
            Edge::Error,
            Edge::Overflow,
            Edge::node(NodeId::new(5), false),
            Edge::node(NodeId::new(5), true),
        ];
        for e in edges {
            assert_eq!(-(-e), e);
        }
        assert_eq!(-Edge::Zero, Edge::One);
        assert_eq!(-Edge::Error, Edge::Error);
        assert_eq!(-Edge::Overflow, Edge::Overflow);
    }

    #[test]
    fn test_normalize() {
        let x = Edge::node(NodeId::new(3), false);
        assert_eq!(x.normalize(), (x, false));
        assert_eq!((-x).normalize(), (x, true));
        assert_eq!(Edge::One.normalize(), (Edge::Zero, true));
        assert_eq!(Edge::Zero.normalize(), (Edge::Zero, false));
        assert_eq!(Edge::Error.normalize(), (Edge::Error, false));
    }

    #[test]
    fn test_raw_encoding() {
        assert_eq!(Edge::Zero.raw(), 0);
        assert_eq!(Edge::One.raw(), 1);
        assert_eq!(Edge::Error.raw(), 2);
        assert_eq!(Edge::Overflow.raw(), 3);
        assert_eq!(Edge::node(NodeId::new(0), false).raw(), 4);
        assert_eq!(Edge::node(NodeId::new(0), true).raw(), 5);
        assert_eq!(Edge::node(NodeId::new(7), true).raw(), 19);

        for raw in [0, 1, 2, 3, 4, 5, 19, 1000] {
            assert_eq!(Edge::from_raw(raw).map(Edge::raw), Some(raw));
        }
        assert_eq!(Edge::from_raw(u64::MAX), None);
    }

    #[test]
    fn test_ordering_follows_raw() {
        let a = Edge::node(NodeId::new(1), false);
        let b = Edge::node(NodeId::new(1), true);
        let c = Edge::node(NodeId::new(2), false);
        assert!(Edge::One < a);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_display() {
        assert_eq!(Edge::node(NodeId::new(12), true).to_string(), "~@12");
        assert_eq!(Edge::node(NodeId::new(12), false).to_string(), "@12");
        assert_eq!(Edge::Overflow.to_string(), "O");
    }
}
