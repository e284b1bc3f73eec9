//! In-place swap of two adjacent levels, the building block of dynamic
//! variable ordering.
//!
//! Swapping levels `l` (variable `x`) and `l + 1` (variable `y`) touches
//! only the nodes on those two levels:
//!
//! - `y`-nodes move up to `l` unchanged;
//! - `x`-nodes that do not depend on `y` move down to `l + 1` unchanged;
//! - every other `x`-node keeps its slot but becomes a `y`-node with
//!   children `x ? f10 : f00` and `x ? f11 : f01`, where `fxy` are its
//!   grandchildren.
//!
//! Since no slot changes meaning, every edge held anywhere (handles, cache
//! owners, dumped edges) still denotes the same function afterwards.
//!
//! # References
//!
//! - R. Rudell. "Dynamic variable ordering for ordered binary decision diagrams."
//!   ICCAD 1993. DOI: 10.1109/ICCAD.1993.580054

use log::{debug, info, warn};

use crate::edge::{Edge, NodeId};
use crate::error::SwapError;
use crate::mgr::{BddMgr, MgrCore};
use crate::types::Level;

/// An `x`-node that depends on `y`, with its grandchildren.
struct Restructure {
    id: NodeId,
    f00: Edge,
    f01: Edge,
    f10: Edge,
    f11: Edge,
}

impl MgrCore {
    fn swap_levels(&mut self, level: Level) -> Result<(), SwapError> {
        let below = match level.checked_next() {
            Some(below) if (below.index() as usize) < self.vars.len() => below,
            _ => return Err(SwapError::NoSuchLevel(level.index())),
        };

        let mut upper = Vec::new();
        let mut lower = Vec::new();
        for (id, node) in self.table.iter() {
            if node.level == level {
                upper.push(id);
            } else if node.level == below {
                lower.push(id);
            }
        }

        let mut independent = Vec::new();
        let mut dependent = Vec::new();
        for &id in &upper {
            let node = self.table.node(id);
            let (e0, e1) = (node.e0, node.e1);
            if self.table.level_of(e0) != below && self.table.level_of(e1) != below {
                independent.push(id);
                continue;
            }
            let (f00, f01) = self.table.cofactors(e0, below);
            let (f10, f11) = self.table.cofactors(e1, below);
            dependent.push(Restructure { id, f00, f01, f10, f11 });
        }

        // Each restructured node needs at most two new children.
        if !self.table.reserve(2 * dependent.len()) {
            return Err(SwapError::Overflow);
        }
        debug!(
            "Swapping {} and {}: {} moved up, {} moved down, {} restructured",
            level,
            below,
            lower.len(),
            independent.len(),
            dependent.len()
        );

        for &id in upper.iter().chain(&lower) {
            self.table.unlink(id.raw());
        }
        for &id in &lower {
            self.table.node_mut(id).level = level;
            self.table.link(id.raw());
        }
        for &id in &independent {
            self.table.node_mut(id).level = below;
            self.table.link(id.raw());
        }
        for r in &dependent {
            let e0 = self.table.get_or_create(below, r.f00, r.f10);
            let e1 = self.table.get_or_create(below, r.f01, r.f11);
            debug_assert!(!e0.is_invalid() && !e1.is_invalid());
            debug_assert!(!e0.is_complemented() && e0 != e1);
            let node = self.table.node_mut(r.id);
            node.e0 = e0;
            node.e1 = e1;
            self.table.link(r.id.raw());
        }

        self.vars.swap(level);
        self.clear_caches();
        Ok(())
    }
}

impl BddMgr {
    /// Exchanges the variables at `level` and `level + 1`.
    ///
    /// All handles keep their functions. Requires dynamic variable ordering
    /// to be enabled; a refused swap leaves the manager unchanged.
    ///
    /// ```
    /// use bdd_mgr::{BddMgr, Level, MgrConfig, VarId};
    ///
    /// let mgr = BddMgr::new(MgrConfig::default().with_dvo(true));
    /// let x = mgr.make_posiliteral(VarId::new(0));
    /// let y = mgr.make_posiliteral(VarId::new(1));
    /// let f = &x & &!&y;
    /// mgr.swap_levels(Level::new(0)).unwrap();
    /// assert_eq!(mgr.var_list(), vec![VarId::new(1), VarId::new(0)]);
    /// assert_eq!(f.root_var(), Some(VarId::new(1)));
    /// assert_eq!(f, &x & &!&y);
    /// ```
    pub fn swap_levels(&self, level: Level) -> Result<(), SwapError> {
        if !self.dvo_enabled() {
            warn!("Level swap refused: {}", SwapError::DvoDisabled);
            return Err(SwapError::DvoDisabled);
        }
        let result = self.core.borrow_mut().swap_levels(level);
        match result {
            Ok(()) => info!("Swapped level {} with the one below", level),
            Err(e) => warn!("Level swap refused: {}", e),
        }
        result
    }
}
