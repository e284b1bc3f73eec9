//! The apply/ITE engine.
//!
//! Every operation here works on raw [`Edge`]s inside one borrow of the
//! manager core and returns [`Res`]: a sentinel operand or an exhausted node
//! table turns into an `Err` that `?` carries straight up to the caller,
//! without creating further nodes. The public handle layer turns it back
//! into the `Error` / `Overflow` edge.
//!
//! Recursion always descends at least one level, so its depth is bounded by
//! the number of variables.

use std::collections::HashMap;

use log::debug;

use crate::cache::{Key2, Key3, Op};
use crate::edge::Edge;
use crate::error::Invalid;
use crate::mgr::{absorb, MgrCore, Res};
use crate::types::{Level, VarId};

/// Binary Boolean operators.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinOp {
    And,
    Or,
    Xor,
}

impl MgrCore {
    pub(crate) fn apply(&mut self, op: BinOp, f: Edge, g: Edge) -> Res {
        match op {
            BinOp::And => self.and(f, g),
            BinOp::Or => self.or(f, g),
            BinOp::Xor => self.xor(f, g),
        }
    }

    pub(crate) fn and(&mut self, f: Edge, g: Edge) -> Res {
        absorb(&[f, g])?;

        if f.is_zero() || g.is_zero() {
            return Ok(Edge::Zero);
        }
        if f.is_one() {
            return Ok(g);
        }
        if g.is_one() || f == g {
            return Ok(f);
        }
        if f == -g {
            return Ok(Edge::Zero);
        }

        let (f, g) = if f <= g { (f, g) } else { (g, f) };
        let key = Key2 { op: Op::And, f, g };
        if let Some(res) = self.cache2.get(&key) {
            return Ok(res);
        }

        let m = self.table.level_of(f).min(self.table.level_of(g));
        let (f0, f1) = self.table.cofactors(f, m);
        let (g0, g1) = self.table.cofactors(g, m);
        let e = self.and(f0, g0)?;
        let t = self.and(f1, g1)?;
        let res = self.new_node(m, e, t)?;

        self.cache2.insert(key, res);
        Ok(res)
    }

    /// `f | g == ~(~f & ~g)`
    pub(crate) fn or(&mut self, f: Edge, g: Edge) -> Res {
        Ok(-self.and(-f, -g)?)
    }

    pub(crate) fn xor(&mut self, f: Edge, g: Edge) -> Res {
        absorb(&[f, g])?;

        if f.is_zero() {
            return Ok(g);
        }
        if g.is_zero() {
            return Ok(f);
        }
        if f.is_one() {
            return Ok(-g);
        }
        if g.is_one() {
            return Ok(-f);
        }
        if f == g {
            return Ok(Edge::Zero);
        }
        if f == -g {
            return Ok(Edge::One);
        }

        // ~f ^ g == f ^ ~g == ~(f ^ g)
        let (f, pf) = f.normalize();
        let (g, pg) = g.normalize();
        let n = pf != pg;
        let (f, g) = if f <= g { (f, g) } else { (g, f) };

        let key = Key2 { op: Op::Xor, f, g };
        if let Some(res) = self.cache2.get(&key) {
            return Ok(res.negate_if(n));
        }

        let m = self.table.level_of(f).min(self.table.level_of(g));
        let (f0, f1) = self.table.cofactors(f, m);
        let (g0, g1) = self.table.cofactors(g, m);
        let e = self.xor(f0, g0)?;
        let t = self.xor(f1, g1)?;
        let res = self.new_node(m, e, t)?;

        self.cache2.insert(key, res);
        Ok(res.negate_if(n))
    }

    /// If-then-else: `(f & g) | (~f & h)`.
    pub(crate) fn ite(&mut self, f: Edge, g: Edge, h: Edge) -> Res {
        absorb(&[f, g, h])?;

        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if f.is_one() {
            return Ok(g);
        }
        if f.is_zero() {
            return Ok(h);
        }

        // More base cases:
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        //   ite(F,1,~F) => 1
        //   ite(F,F,1) => 1
        //   ite(F,~F,0) => 0
        //   ite(F,0,F) => F
        if g == h {
            return Ok(g);
        }
        if g.is_one() && h.is_zero() {
            return Ok(f);
        }
        if g.is_zero() && h.is_one() {
            return Ok(-f);
        }
        if (g.is_one() && h == -f) || (g == f && h.is_one()) {
            return Ok(Edge::One);
        }
        if g == -f && h.is_zero() {
            return Ok(Edge::Zero);
        }
        if g.is_zero() && h == f {
            return Ok(f);
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,~F) => ite(F,G,1)
        if g == f {
            debug!("ite(F,F,H) => ite(F,1,H)");
            return self.ite(f, Edge::One, h);
        }
        if h == f {
            debug!("ite(F,G,F) => ite(F,G,0)");
            return self.ite(f, g, Edge::Zero);
        }
        if g == -f {
            debug!("ite(F,~F,H) => ite(F,0,H)");
            return self.ite(f, Edge::Zero, h);
        }
        if h == -f {
            debug!("ite(F,G,~F) => ite(F,G,1)");
            return self.ite(f, g, Edge::One);
        }

        let i = self.table.level_of(f);
        let j = self.table.level_of(g);
        let k = self.table.level_of(h);

        // Equivalent pairs (choose the one with the topmost variable first):
        //   ite(F,1,H) == ite(H,1,F) == F ∨ H
        //   ite(F,G,0) == ite(G,F,0) == F ∧ G
        //   ite(F,G,1) == ite(~G,~F,1) == F -> G
        //   ite(F,0,H) == ite(~H,0,~F) == ~F ∧ H
        //   ite(F,G,~G) == ite(G,F,~F)
        if g.is_one() && k < i {
            debug!("ite(F,1,H) => ite(H,1,F)");
            return self.ite(h, Edge::One, f);
        }
        if h.is_zero() && j < i {
            debug!("ite(F,G,0) => ite(G,F,0)");
            return self.ite(g, f, Edge::Zero);
        }
        if h.is_one() && j < i {
            debug!("ite(F,G,1) => ite(~G,~F,1)");
            return self.ite(-g, -f, Edge::One);
        }
        if g.is_zero() && k < i {
            debug!("ite(F,0,H) => ite(~H,0,~F)");
            return self.ite(-h, Edge::Zero, -f);
        }
        if g == -h && j < i {
            debug!("ite(F,G,~G) => ite(G,F,~F)");
            return self.ite(g, f, -f);
        }

        // Make the first two arguments regular:
        //   ite(~F,G,H) => ite(F,H,G)
        //   ite(F,~G,H) => ~ite(F,G,~H)
        let (f, g, h) = if f.is_complemented() { (-f, h, g) } else { (f, g, h) };
        let (g, n) = g.normalize();
        let h = h.negate_if(n);

        let key = Key3 { op: Op::Ite, f, g, h };
        if let Some(res) = self.cache3.get(&key) {
            return Ok(res.negate_if(n));
        }

        let m = i.min(self.table.level_of(g)).min(self.table.level_of(h));
        let (f0, f1) = self.table.cofactors(f, m);
        let (g0, g1) = self.table.cofactors(g, m);
        let (h0, h1) = self.table.cofactors(h, m);
        let e = self.ite(f0, g0, h0)?;
        let t = self.ite(f1, g1, h1)?;
        let res = self.new_node(m, e, t)?;

        self.cache3.insert(key, res);
        Ok(res.negate_if(n))
    }

    /// Checks whether `f -> g` is a tautology, without building nodes.
    pub(crate) fn implies(&mut self, f: Edge, g: Edge) -> Res<bool> {
        absorb(&[f, g])?;

        if f.is_zero() || g.is_one() || f == g {
            return Ok(true);
        }
        // Here f is not 0 and g is not 1.
        if f.is_one() || g.is_zero() || f == -g {
            return Ok(false);
        }

        let key = Key2 { op: Op::Implies, f, g };
        if let Some(res) = self.cache2.get(&key) {
            return Ok(res.is_one());
        }

        let m = self.table.level_of(f).min(self.table.level_of(g));
        let (f0, f1) = self.table.cofactors(f, m);
        let (g0, g1) = self.table.cofactors(g, m);
        let res = self.implies(f0, g0)? && self.implies(f1, g1)?;

        self.cache2.insert(key, if res { Edge::One } else { Edge::Zero });
        Ok(res)
    }

    /// Cofactor of `f` with the variable at `level` fixed to `pol`.
    pub(crate) fn cofactor(&mut self, f: Edge, level: Level, pol: bool) -> Res {
        absorb(&[f])?;
        if f.is_const() {
            return Ok(f);
        }

        let top = self.table.level_of(f);
        if top > level {
            return Ok(f);
        }
        if top == level {
            let (f0, f1) = self.table.cofactors(f, level);
            return Ok(if pol { f1 } else { f0 });
        }

        let (f, n) = f.normalize();
        let key = Key2 {
            op: Op::Cofactor {
                level: level.index(),
                pol,
            },
            f,
            g: Edge::Zero,
        };
        if let Some(res) = self.cache2.get(&key) {
            return Ok(res.negate_if(n));
        }

        let (f0, f1) = self.table.cofactors(f, top);
        let e = self.cofactor(f0, level, pol)?;
        let t = self.cofactor(f1, level, pol)?;
        let res = self.new_node(top, e, t)?;

        self.cache2.insert(key, res);
        Ok(res.negate_if(n))
    }

    /// Drops all pending substitutions and the compose cache.
    pub(crate) fn compose_start(&mut self) {
        for (_, e) in std::mem::take(&mut self.compose_regs) {
            self.dec_root(e);
        }
        self.compose_cache.clear();
    }

    /// Registers the substitution `var := g`. Unknown variables are ignored.
    ///
    /// Returns `false` if `var` was ignored.
    pub(crate) fn compose_reg(&mut self, var: VarId, g: Edge) -> bool {
        if self.vars.level(var).is_none() {
            debug!("compose_reg: {} is not registered, ignoring", var);
            return false;
        }
        self.inc_root(g);
        self.compose_regs.push((var, g));
        self.compose_cache.clear();
        true
    }

    /// Applies all registered substitutions to `f` simultaneously.
    pub(crate) fn compose(&mut self, f: Edge) -> Res {
        absorb(&[f])?;

        let mut subst = HashMap::new();
        for &(var, g) in &self.compose_regs {
            let level = self.vars.level(var).ok_or(Invalid::Error)?;
            subst.insert(level, g);
        }
        let Some(&bottom) = subst.keys().max() else {
            return Ok(f);
        };
        absorb(&subst.values().copied().collect::<Vec<_>>())?;

        self.compose_step(f, &subst, bottom)
    }

    fn compose_step(&mut self, f: Edge, subst: &HashMap<Level, Edge>, bottom: Level) -> Res {
        if f.is_const() {
            return Ok(f);
        }
        let top = self.table.level_of(f);
        if top > bottom {
            return Ok(f);
        }

        let (f, n) = f.normalize();
        if let Some(res) = self.compose_cache.get(&f) {
            return Ok(res.negate_if(n));
        }

        let (f0, f1) = self.table.cofactors(f, top);
        let e = self.compose_step(f0, subst, bottom)?;
        let t = self.compose_step(f1, subst, bottom)?;
        let sel = match subst.get(&top) {
            Some(&g) => g,
            None => self.literal(top, true)?,
        };
        let res = self.ite(sel, t, e)?;

        self.compose_cache.insert(f, res);
        Ok(res.negate_if(n))
    }
}
