//! Single satisfying paths.
//!
//! A *onepath* of `f` is a cube (conjunction of literals along one path from
//! the root to `One`) that implies `f`. [`Bdd::onepath`] takes the first
//! path it finds, [`Bdd::shortest_onepath`] the one with the fewest positive
//! literals.
//!
//! # Cost model
//!
//! Taking the then-branch of a node adds a positive literal and costs 1, the
//! else-branch costs nothing. Between two branches of equal cost the
//! else-branch wins. `-1` stands for "no path" in the internal recursion.
//!
//! ```
//! use bdd_mgr::{BddMgr, VarId};
//!
//! let mgr = BddMgr::default();
//! let x = mgr.make_posiliteral(VarId::new(0));
//! let y = mgr.make_posiliteral(VarId::new(1));
//! let z = mgr.make_posiliteral(VarId::new(2));
//!
//! // x & y needs two positive literals, ~z only one negative.
//! let f = &(&x & &y) | &!&z;
//! let p = f.shortest_onepath();
//! assert!(p.implies(&f));
//! assert_eq!(f.shortest_onepath_len(), Some(0));
//! ```

use std::collections::HashMap;

use crate::bdd::Bdd;
use crate::edge::Edge;
use crate::mgr::{absorb, MgrCore, Res};

impl MgrCore {
    pub(crate) fn onepath(&mut self, e: Edge) -> Res {
        absorb(&[e])?;
        if e.is_const() {
            return Ok(e);
        }

        let level = self.table.level_of(e);
        let (e0, e1) = self.table.cofactors(e, level);
        if e1.is_zero() {
            let chd = self.onepath(e0)?;
            self.new_node(level, chd, Edge::Zero)
        } else {
            let chd = self.onepath(e1)?;
            self.new_node(level, Edge::Zero, chd)
        }
    }

    pub(crate) fn shortest_onepath(&mut self, e: Edge) -> Res {
        absorb(&[e])?;
        let mut memo = HashMap::new();
        Ok(self.sp_step(e, &mut memo)?.0)
    }

    fn sp_step(&mut self, e: Edge, memo: &mut HashMap<Edge, (Edge, i32)>) -> Res<(Edge, i32)> {
        if e.is_zero() {
            return Ok((Edge::Zero, -1));
        }
        if e.is_one() {
            return Ok((Edge::One, 0));
        }
        if let Some(&res) = memo.get(&e) {
            return Ok(res);
        }

        let level = self.table.level_of(e);
        let (e0, e1) = self.table.cofactors(e, level);
        let (l, llen) = self.sp_step(e0, memo)?;
        let (h, hlen) = self.sp_step(e1, memo)?;

        let res = if take_then(llen, hlen) {
            (self.new_node(level, Edge::Zero, h)?, hlen + 1)
        } else {
            (self.new_node(level, l, Edge::Zero)?, llen)
        };
        memo.insert(e, res);
        Ok(res)
    }

    pub(crate) fn shortest_onepath_len(&self, e: Edge) -> Res<i32> {
        absorb(&[e])?;
        let mut memo = HashMap::new();
        Ok(self.spl_step(e, &mut memo))
    }

    fn spl_step(&self, e: Edge, memo: &mut HashMap<Edge, i32>) -> i32 {
        if e.is_zero() {
            return -1;
        }
        if e.is_one() {
            return 0;
        }
        if let Some(&len) = memo.get(&e) {
            return len;
        }

        let level = self.table.level_of(e);
        let (e0, e1) = self.table.cofactors(e, level);
        let llen = self.spl_step(e0, memo);
        let hlen = self.spl_step(e1, memo);

        let len = if take_then(llen, hlen) { hlen + 1 } else { llen };
        memo.insert(e, len);
        len
    }
}

/// Whether the then-branch is strictly cheaper than the else-branch.
fn take_then(llen: i32, hlen: i32) -> bool {
    hlen != -1 && (llen == -1 || hlen + 1 < llen)
}

impl<'m> Bdd<'m> {
    /// A cube that implies this function, found by preferring then-branches.
    ///
    /// `Zero` gives `Zero` and `One` gives `One`.
    pub fn onepath(&self) -> Bdd<'m> {
        let f = self.edge();
        self.mgr().run(|core| core.onepath(f))
    }

    /// A cube that implies this function with the fewest positive literals.
    pub fn shortest_onepath(&self) -> Bdd<'m> {
        let f = self.edge();
        self.mgr().run(|core| core.shortest_onepath(f))
    }

    /// Number of positive literals in [`shortest_onepath`](Self::shortest_onepath).
    ///
    /// `None` for `Zero` and for invalid handles.
    pub fn shortest_onepath_len(&self) -> Option<u32> {
        let len = self.mgr().core.borrow().shortest_onepath_len(self.edge()).ok()?;
        u32::try_from(len).ok()
    }
}
