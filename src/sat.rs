//! Queries on a function: size, support, satisfying assignments, evaluation.

use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::edge::{Edge, NodeId};
use crate::mgr::MgrCore;
use crate::types::VarId;

impl MgrCore {
    /// Nodes reachable from `e`, each once.
    fn descendants(&mut self, e: Edge) -> Vec<NodeId> {
        let roots: Vec<NodeId> = e.node_id().into_iter().collect();
        let visited = self.table.scan(&roots);
        for &id in &visited {
            self.table.node_mut(id).set_scan_mark(false);
        }
        visited
    }

    pub(crate) fn size(&mut self, e: Edge) -> usize {
        self.descendants(e).len()
    }

    /// Variables `e` depends on, top level first.
    pub(crate) fn support(&mut self, e: Edge) -> Vec<VarId> {
        let mut levels: Vec<_> = self
            .descendants(e)
            .into_iter()
            .map(|id| self.table.node(id).level)
            .collect();
        levels.sort_unstable();
        levels.dedup();
        levels.into_iter().filter_map(|l| self.vars.varid(l)).collect()
    }

    pub(crate) fn minterm_count(&self, e: Edge, nvars: u32) -> BigUint {
        let max = BigUint::from(1u32) << nvars;
        let mut cache = HashMap::new();
        self.minterm_step(e, &max, &mut cache)
    }

    /// Counts are computed for the regular node, then complemented.
    fn minterm_step(&self, e: Edge, max: &BigUint, cache: &mut HashMap<NodeId, BigUint>) -> BigUint {
        let (id, c) = match e {
            Edge::Zero => return BigUint::ZERO,
            Edge::One => return max.clone(),
            Edge::Node(id, c) => (id, c),
            _ => return BigUint::ZERO,
        };

        let count = match cache.get(&id) {
            Some(count) => count.clone(),
            None => {
                let node = self.table.node(id);
                let (low, high) = (node.e0, node.e1);
                let count_low = self.minterm_step(low, max, cache);
                let count_high = self.minterm_step(high, max, cache);
                let count: BigUint = (count_low + count_high) >> 1;
                cache.insert(id, count.clone());
                count
            }
        };
        if c {
            max - count
        } else {
            count
        }
    }

    /// Decision variable and cofactors at the top of a node edge.
    fn branch(&self, e: Edge) -> Option<(VarId, Edge, Edge)> {
        let level = self.table.level_of(e);
        let var = self.vars.varid(level)?;
        let (e0, e1) = self.table.cofactors(e, level);
        Some((var, e0, e1))
    }
}

impl<'m> Bdd<'m> {
    /// Number of nodes, terminals not counted.
    pub fn size(&self) -> usize {
        self.mgr().core.borrow_mut().size(self.edge())
    }

    /// Variables the function depends on, in level order.
    pub fn support(&self) -> Vec<VarId> {
        self.mgr().core.borrow_mut().support(self.edge())
    }

    /// Number of satisfying assignments over `nvars` variables.
    ///
    /// `nvars` must cover the support. Invalid handles count zero.
    ///
    /// ```
    /// use bdd_mgr::{BddMgr, VarId};
    /// use num_bigint::BigUint;
    ///
    /// let mgr = BddMgr::default();
    /// let x = mgr.make_posiliteral(VarId::new(0));
    /// let y = mgr.make_posiliteral(VarId::new(1));
    /// assert_eq!((&x | &y).minterm_count(2), BigUint::from(3u32));
    /// assert_eq!((&x | &y).minterm_count(10), BigUint::from(768u32));
    /// ```
    pub fn minterm_count(&self, nvars: u32) -> BigUint {
        self.mgr().core.borrow().minterm_count(self.edge(), nvars)
    }

    /// Value under `assignment`; `None` for invalid handles.
    ///
    /// The manager is not borrowed while `assignment` runs, so it may use the manager.
    pub fn eval(&self, assignment: impl Fn(VarId) -> bool) -> Option<bool> {
        let mut e = self.edge();
        loop {
            match e {
                Edge::Zero => return Some(false),
                Edge::One => return Some(true),
                Edge::Node(_, _) => {
                    let (var, e0, e1) = self.mgr().core.borrow().branch(e)?;
                    e = if assignment(var) { e1 } else { e0 };
                }
                _ => return None,
            }
        }
    }

    /// Values for every assignment of `vars`, with `vars[0]` as the most
    /// significant bit of the row index.
    ///
    /// Variables outside `vars` are taken as false.
    pub fn to_truth_table(&self, vars: &[VarId]) -> Option<Vec<bool>> {
        let n = vars.len();
        if n >= usize::BITS as usize {
            return None;
        }
        (0..1usize << n)
            .map(|p| {
                self.eval(|v| {
                    vars.iter()
                        .position(|&w| w == v)
                        .is_some_and(|i| (p >> (n - 1 - i)) & 1 != 0)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::mgr::BddMgr;

    use super::*;

    #[test]
    fn test_size() {
        let mgr = BddMgr::default();
        let x: Vec<_> = (0..4).map(|i| mgr.make_posiliteral(VarId::new(i))).collect();
        assert_eq!(mgr.make_one().size(), 0);
        assert_eq!(x[2].size(), 1);
        assert_eq!((!&x[2]).size(), 1);
        // Parity shares one node per level thanks to complement edges.
        let parity = &(&x[0] ^ &x[1]) ^ &(&x[2] ^ &x[3]);
        assert_eq!(parity.size(), 4);
    }

    #[test]
    fn test_support() {
        let mgr = BddMgr::default();
        let x: Vec<_> = (0..5).map(|i| mgr.make_posiliteral(VarId::new(i))).collect();
        let f = &(&x[3] & &x[1]) | &x[4];
        assert_eq!(f.support(), vec![VarId::new(1), VarId::new(3), VarId::new(4)]);
        assert!(mgr.make_zero().support().is_empty());
        assert!((&x[2] | &!&x[2]).support().is_empty());
    }

    #[test]
    fn test_minterm_count() {
        let mgr = BddMgr::default();
        let x: Vec<_> = (0..3).map(|i| mgr.make_posiliteral(VarId::new(i))).collect();
        assert_eq!(mgr.make_zero().minterm_count(3), BigUint::ZERO);
        assert_eq!(mgr.make_one().minterm_count(3), BigUint::from(8u32));
        assert_eq!(x[1].minterm_count(3), BigUint::from(4u32));
        assert_eq!((!&x[1]).minterm_count(3), BigUint::from(4u32));
        let f = &(&x[0] & &x[1]) | &x[2];
        assert_eq!(f.minterm_count(3), BigUint::from(5u32));
        assert_eq!((!&f).minterm_count(3), BigUint::from(3u32));
        assert_eq!(mgr.make_error().minterm_count(3), BigUint::ZERO);
    }

    #[test]
    fn test_minterm_count_large() {
        let mgr = BddMgr::default();
        let x: Vec<_> = (0..100).map(|i| mgr.make_posiliteral(VarId::new(i))).collect();
        let f = x.iter().fold(mgr.make_zero(), |acc, v| &acc ^ v);
        let expected = BigUint::from(1u32) << 99u32;
        assert_eq!(f.minterm_count(100), expected);
    }

    #[test]
    fn test_eval_and_truth_table() {
        let mgr = BddMgr::default();
        let a = VarId::new(0);
        let b = VarId::new(1);
        let f = &mgr.make_posiliteral(a) & &mgr.make_negaliteral(b);
        assert_eq!(f.eval(|v| v == a), Some(true));
        assert_eq!(f.eval(|_| true), Some(false));
        assert_eq!(mgr.make_overflow().eval(|_| true), None);
        // Rows: ab = 00, 01, 10, 11
        assert_eq!(f.to_truth_table(&[a, b]), Some(vec![false, false, true, false]));
        assert_eq!(f.to_truth_table(&[b, a]), Some(vec![false, true, false, false]));
        assert_eq!(mgr.make_error().to_truth_table(&[a]), None);
    }

    #[test]
    fn test_eval_assignment_may_use_manager() {
        let mgr = BddMgr::default();
        let x = mgr.make_posiliteral(VarId::new(0));
        let y = mgr.make_posiliteral(VarId::new(1));
        let f = &x ^ &y;
        // Each variable takes the value of its own literal at the all-true point.
        let value = f.eval(|v| mgr.make_posiliteral(v).eval(|_| true) == Some(true));
        assert_eq!(value, Some(false));
        assert_eq!(x.eval(|v| !mgr.make_negaliteral(v).is_zero()), Some(true));
        assert_eq!(mgr.node_num(), 2);
    }
}
