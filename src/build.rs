//! Building functions from other descriptions: cubes, n-ary operations,
//! truth tables, expressions and threshold functions.

use std::collections::HashMap;

use log::debug;

use crate::apply::BinOp;
use crate::bdd::Bdd;
use crate::edge::Edge;
use crate::expr::Expr;
use crate::mgr::{absorb, check, BddMgr, MgrCore, Res};
use crate::types::VarId;

impl MgrCore {
    /// Reduces `edges` pairwise, as a balanced tree.
    fn reduce(&mut self, op: BinOp, mut edges: Vec<Edge>) -> Res {
        absorb(&edges)?;
        if edges.is_empty() {
            return Ok(match op {
                BinOp::And => Edge::One,
                BinOp::Or | BinOp::Xor => Edge::Zero,
            });
        }
        while edges.len() > 1 {
            let mut next = Vec::with_capacity((edges.len() + 1) / 2);
            for pair in edges.chunks(2) {
                next.push(match *pair {
                    [f, g] => self.apply(op, f, g)?,
                    _ => pair[0],
                });
            }
            edges = next;
        }
        Ok(edges[0])
    }

    fn tvec(&mut self, values: &[bool], vars: &[VarId]) -> Res {
        match vars.split_first() {
            None => Ok(if values[0] { Edge::One } else { Edge::Zero }),
            Some((&top, rest)) => {
                let lit = self.var_literal(top, true)?;
                let (lo, hi) = values.split_at(values.len() / 2);
                let e0 = self.tvec(lo, rest)?;
                let e1 = self.tvec(hi, rest)?;
                self.ite(lit, e1, e0)
            }
        }
    }

    fn expr(&mut self, expr: &Expr, map: &HashMap<VarId, Edge>) -> Res {
        match expr {
            Expr::Zero => Ok(Edge::Zero),
            Expr::One => Ok(Edge::One),
            Expr::Literal(var, pol) => match map.get(var) {
                Some(&e) => Ok(check(e)?.negate_if(!pol)),
                None => self.var_literal(*var, *pol),
            },
            Expr::Not(inner) => Ok(-self.expr(inner, map)?),
            Expr::And(children) => self.expr_all(BinOp::And, children, map),
            Expr::Or(children) => self.expr_all(BinOp::Or, children, map),
            Expr::Xor(children) => self.expr_all(BinOp::Xor, children, map),
        }
    }

    fn expr_all(&mut self, op: BinOp, children: &[Expr], map: &HashMap<VarId, Edge>) -> Res {
        let edges = children
            .iter()
            .map(|c| self.expr(c, map))
            .collect::<Res<Vec<_>>>()?;
        self.reduce(op, edges)
    }

    /// At least `k` of the variables `0..n` are true.
    fn thfunc(&mut self, n: u32, k: u32) -> Res {
        if k > n {
            return Ok(Edge::Zero);
        }
        for i in 0..n {
            self.var_literal(VarId::new(i), true)?;
        }
        let k = k as usize;
        // row[j]: at least j of the variables i..n are true
        let mut row = vec![Edge::Zero; k + 1];
        row[0] = Edge::One;
        for i in (0..n).rev() {
            let lit = self.var_literal(VarId::new(i), true)?;
            let remaining = (n - i) as usize;
            let mut next = vec![Edge::Zero; k + 1];
            next[0] = Edge::One;
            for j in 1..=k.min(remaining) {
                next[j] = self.ite(lit, row[j - 1], row[j])?;
            }
            row = next;
        }
        Ok(row[k])
    }
}

impl BddMgr {
    /// Conjunction of literals.
    ///
    /// A variable given with both polarities makes the cube `Zero`.
    pub fn make_cube(&self, lits: &[(VarId, bool)]) -> Bdd<'_> {
        self.run(|core| {
            let edges = lits
                .iter()
                .map(|&(var, pol)| core.var_literal(var, pol))
                .collect::<Res<Vec<_>>>()?;
            core.reduce(BinOp::And, edges)
        })
    }

    fn reduce_all<'m, 'b, I>(&'m self, op: BinOp, items: I) -> Bdd<'m>
    where
        'm: 'b,
        I: IntoIterator<Item = &'b Bdd<'m>>,
    {
        let mut edges = Vec::new();
        for f in items {
            if !f.belongs_to(self) {
                debug!("{:?} over handles of different managers", op);
                return self.make_error();
            }
            edges.push(f.edge());
        }
        self.run(|core| core.reduce(op, edges.clone()))
    }

    /// Conjunction of all functions; `One` for none.
    pub fn and_all<'m, 'b, I>(&'m self, items: I) -> Bdd<'m>
    where
        'm: 'b,
        I: IntoIterator<Item = &'b Bdd<'m>>,
    {
        self.reduce_all(BinOp::And, items)
    }

    /// Disjunction of all functions; `Zero` for none.
    pub fn or_all<'m, 'b, I>(&'m self, items: I) -> Bdd<'m>
    where
        'm: 'b,
        I: IntoIterator<Item = &'b Bdd<'m>>,
    {
        self.reduce_all(BinOp::Or, items)
    }

    /// Parity of all functions; `Zero` for none.
    pub fn xor_all<'m, 'b, I>(&'m self, items: I) -> Bdd<'m>
    where
        'm: 'b,
        I: IntoIterator<Item = &'b Bdd<'m>>,
    {
        self.reduce_all(BinOp::Xor, items)
    }

    /// Function with the given truth table.
    ///
    /// Entry `p` is the value where `vars[i]` equals bit `n-1-i` of `p`, so
    /// `vars[0]` is the most significant. The table must have `2^n` entries
    /// and the variables must be distinct, otherwise the result is `Error`.
    ///
    /// ```
    /// use bdd_mgr::{BddMgr, VarId};
    ///
    /// let mgr = BddMgr::default();
    /// let (a, b) = (VarId::new(0), VarId::new(1));
    /// let f = mgr.tvec_to_bdd(&[false, false, true, false], &[a, b]);
    /// assert_eq!(f, &mgr.make_posiliteral(a) & &mgr.make_negaliteral(b));
    /// ```
    pub fn tvec_to_bdd(&self, values: &[bool], vars: &[VarId]) -> Bdd<'_> {
        let n = vars.len();
        let size_ok = n < usize::BITS as usize && values.len() == 1 << n;
        let distinct = vars.iter().enumerate().all(|(i, v)| !vars[..i].contains(v));
        if !size_ok || !distinct {
            debug!("Truth table of {} entries over {} variables rejected", values.len(), n);
            return self.make_error();
        }
        self.run(|core| core.tvec(values, vars))
    }

    /// Builds `expr`, reading variables found in `map` as the mapped functions.
    ///
    /// Other variables become literals and are registered as needed.
    pub fn expr_to_bdd<'m>(&'m self, expr: &Expr, map: Option<&HashMap<VarId, Bdd<'m>>>) -> Bdd<'m> {
        let mut edges = HashMap::new();
        for (&var, f) in map.into_iter().flatten() {
            if !f.belongs_to(self) {
                return self.make_error();
            }
            edges.insert(var, f.edge());
        }
        self.run(|core| core.expr(expr, &edges))
    }

    /// Threshold function: at least `k` of the variables `0..n` are true.
    ///
    /// Variables `0..n` are registered in ascending order if they are new.
    pub fn make_thfunc(&self, n: u32, k: u32) -> Bdd<'_> {
        self.run(|core| core.thfunc(n, k))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::config::MgrConfig;
    use crate::expr::parse_expr;

    use super::*;

    fn vars(n: u32) -> Vec<VarId> {
        (0..n).map(VarId::new).collect()
    }

    #[test]
    fn test_thfunc_3_2() {
        let mgr = BddMgr::default();
        let f = mgr.make_thfunc(3, 2);
        let v = vars(3);
        let table = f.to_truth_table(&v).unwrap();
        for (p, value) in table.iter().enumerate() {
            assert_eq!(*value, p.count_ones() >= 2, "row {:03b}", p);
        }
        // (1, 1, 0) is accepted, (1, 0, 0) is not
        assert_eq!(f.eval(|x| x.id() < 2), Some(true));
        assert_eq!(f.eval(|x| x.id() == 0), Some(false));
    }

    #[test]
    fn test_thfunc_edges() {
        let mgr = BddMgr::default();
        assert!(mgr.make_thfunc(4, 0).is_one());
        assert!(mgr.make_thfunc(4, 5).is_zero());
        let v: Vec<_> = vars(4).into_iter().map(|x| mgr.make_posiliteral(x)).collect();
        assert_eq!(mgr.make_thfunc(4, 4), mgr.and_all(&v));
        assert_eq!(mgr.make_thfunc(4, 1), mgr.or_all(&v));
        assert_eq!(mgr.var_list(), vars(4));
    }

    #[test]
    fn test_thfunc_overflow() {
        let mgr = BddMgr::new(MgrConfig::default().with_max_nodes(20));
        assert!(mgr.make_thfunc(12, 6).is_overflow());
        let big = BddMgr::default();
        assert!(!big.make_thfunc(12, 6).is_invalid());
    }

    #[test]
    fn test_cube() {
        let mgr = BddMgr::default();
        let (a, b, c) = (VarId::new(0), VarId::new(1), VarId::new(2));
        let cube = mgr.make_cube(&[(a, true), (c, false)]);
        assert_eq!(cube, &mgr.make_posiliteral(a) & &mgr.make_negaliteral(c));
        assert!(mgr.make_cube(&[]).is_one());
        assert!(mgr.make_cube(&[(b, true), (b, false)]).is_zero());
    }

    #[test]
    fn test_reduce_all() {
        let mgr = BddMgr::default();
        let x: Vec<_> = vars(5).into_iter().map(|v| mgr.make_posiliteral(v)).collect();
        let chained = x.iter().skip(1).fold(x[0].clone(), |acc, f| &acc ^ f);
        assert_eq!(mgr.xor_all(&x), chained);
        assert!(mgr.and_all(std::iter::empty()).is_one());
        assert!(mgr.or_all(x[..0].iter()).is_zero());

        let other = BddMgr::default();
        let y = other.make_posiliteral(VarId::new(0));
        assert!(mgr.and_all([&x[0], &y]).is_error());

        let bad = [x[1].clone(), mgr.make_overflow(), mgr.make_error()];
        assert!(mgr.or_all(&bad).is_error());
    }

    #[test]
    fn test_tvec_to_bdd() {
        let mgr = BddMgr::default();
        let v = vars(3);
        // majority, rows in order abc = 000 .. 111
        let table = [false, false, false, true, false, true, true, true];
        let f = mgr.tvec_to_bdd(&table, &v);
        assert_eq!(f, mgr.make_thfunc(3, 2));
        assert_eq!(f.to_truth_table(&v).unwrap(), table.to_vec());

        let reversed = [v[2], v[1], v[0]];
        let g = mgr.tvec_to_bdd(&[false, true, false, false, false, false, false, false], &reversed);
        assert_eq!(g, mgr.make_cube(&[(v[0], true), (v[1], false), (v[2], false)]));

        assert!(mgr.tvec_to_bdd(&[true], &[]).is_one());
        assert!(mgr.tvec_to_bdd(&[true, false, true], &v[..2]).is_error());
        assert!(mgr.tvec_to_bdd(&[true; 4], &[v[0], v[0]]).is_error());
    }

    #[test]
    fn test_expr_to_bdd() {
        let mgr = BddMgr::default();
        let e = parse_expr("(x0 | ~x1) & (x2 ^ x0)").unwrap();
        let f = mgr.expr_to_bdd(&e, None);
        let v = vars(3);
        let table = f.to_truth_table(&v).unwrap();
        for (p, value) in table.iter().enumerate() {
            let assignment = |x: VarId| (p >> (2 - x.id())) & 1 != 0;
            assert_eq!(*value, e.eval(&assignment));
        }
    }

    #[test]
    fn test_expr_to_bdd_with_map() {
        let mgr = BddMgr::default();
        let a = mgr.make_posiliteral(VarId::new(10));
        let b = mgr.make_posiliteral(VarId::new(11));
        let mut map = HashMap::new();
        map.insert(VarId::new(0), &a & &b);
        map.insert(VarId::new(1), !&a);

        let e = parse_expr("x0 | ~x1 & x2").unwrap();
        let f = mgr.expr_to_bdd(&e, Some(&map));
        let c = mgr.make_posiliteral(VarId::new(2));
        assert_eq!(f, &(&a & &b) | &(&a & &c));

        let other = BddMgr::default();
        let mut foreign = HashMap::new();
        foreign.insert(VarId::new(0), other.make_one());
        assert!(mgr.expr_to_bdd(&e, Some(&foreign)).is_error());
    }
}
