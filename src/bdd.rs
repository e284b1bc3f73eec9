//! Root handles.
//!
//! A [`Bdd`] is the only way client code holds on to a function. Creating or
//! cloning a handle bumps the root count of the node it points at, dropping
//! it releases that count, so everything a live handle reaches survives
//! garbage collection.

use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ptr;

use log::debug;

use crate::apply::BinOp;
use crate::edge::Edge;
use crate::error::Invalid;
use crate::mgr::{absorb, BddMgr};
use crate::types::{Level, VarId};

/// A Boolean function owned by a [`BddMgr`].
pub struct Bdd<'m> {
    mgr: &'m BddMgr,
    edge: Edge,
}

impl<'m> Bdd<'m> {
    pub(crate) fn new(mgr: &'m BddMgr, edge: Edge) -> Self {
        mgr.inc_root(edge);
        Self { mgr, edge }
    }

    pub fn mgr(&self) -> &'m BddMgr {
        self.mgr
    }

    /// The edge this handle holds. Only valid while some handle keeps it alive.
    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub(crate) fn belongs_to(&self, mgr: &BddMgr) -> bool {
        ptr::eq(self.mgr, mgr)
    }

    pub fn is_zero(&self) -> bool {
        self.edge.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.edge.is_one()
    }

    pub fn is_const(&self) -> bool {
        self.edge.is_const()
    }

    pub fn is_error(&self) -> bool {
        self.edge.is_error()
    }

    pub fn is_overflow(&self) -> bool {
        self.edge.is_overflow()
    }

    pub fn is_invalid(&self) -> bool {
        self.edge.is_invalid()
    }

    /// `Err` if the handle holds `Error` or `Overflow`.
    ///
    /// ```
    /// use bdd_mgr::{BddMgr, Invalid, VarId};
    ///
    /// let mgr = BddMgr::default();
    /// let x = mgr.make_posiliteral(VarId::new(0));
    /// assert!(x.check().is_ok());
    /// assert_eq!(mgr.make_overflow().check().err(), Some(Invalid::Overflow));
    /// ```
    pub fn check(&self) -> Result<&Self, Invalid> {
        match Invalid::of(self.edge) {
            Some(invalid) => Err(invalid),
            None => Ok(self),
        }
    }

    /// Complements the function in place.
    pub fn negate(&mut self) {
        // Same node, so the root count stays as it is.
        self.edge = -self.edge;
    }

    pub fn apply(&self, op: BinOp, other: &Bdd<'m>) -> Bdd<'m> {
        if !other.belongs_to(self.mgr) {
            debug!("{:?} on handles of different managers", op);
            return self.mgr.make_error();
        }
        let (f, g) = (self.edge, other.edge);
        self.mgr.run(|core| core.apply(op, f, g))
    }

    pub fn and(&self, other: &Bdd<'m>) -> Bdd<'m> {
        self.apply(BinOp::And, other)
    }

    pub fn or(&self, other: &Bdd<'m>) -> Bdd<'m> {
        self.apply(BinOp::Or, other)
    }

    pub fn xor(&self, other: &Bdd<'m>) -> Bdd<'m> {
        self.apply(BinOp::Xor, other)
    }

    /// `self ? g : h`
    pub fn ite(&self, g: &Bdd<'m>, h: &Bdd<'m>) -> Bdd<'m> {
        if !g.belongs_to(self.mgr) || !h.belongs_to(self.mgr) {
            return self.mgr.make_error();
        }
        let (f, g, h) = (self.edge, g.edge, h.edge);
        self.mgr.run(|core| core.ite(f, g, h))
    }

    /// Checks whether `self -> other` is a tautology.
    ///
    /// Invalid operands never imply anything.
    pub fn implies(&self, other: &Bdd<'m>) -> bool {
        if !other.belongs_to(self.mgr) {
            return false;
        }
        let (f, g) = (self.edge, other.edge);
        self.mgr.core.borrow_mut().implies(f, g).unwrap_or(false)
    }

    /// Cofactor with `var` fixed to `pol`. Unregistered variables leave the function unchanged.
    pub fn cofactor(&self, var: VarId, pol: bool) -> Bdd<'m> {
        let Some(level) = self.mgr.level(var) else {
            return self.clone();
        };
        let f = self.edge;
        self.mgr.run(|core| core.cofactor(f, level, pol))
    }

    /// Substitutes every `(var, g)` pair simultaneously.
    ///
    /// Clears any substitutions registered through
    /// [`BddMgr::compose_reg`].
    pub fn compose(&self, subst: &[(VarId, &Bdd<'m>)]) -> Bdd<'m> {
        self.mgr.compose_start();
        for &(var, g) in subst {
            if !g.belongs_to(self.mgr) {
                self.mgr.compose_start();
                return self.mgr.make_error();
            }
            self.mgr.compose_reg(var, g);
        }
        let res = self.mgr.compose(self);
        self.mgr.compose_start();
        res
    }

    /// Level of the top node, `None` for terminals.
    pub fn root_level(&self) -> Option<Level> {
        self.edge.node_id()?;
        Some(self.mgr.core.borrow().table.level_of(self.edge))
    }

    /// Variable of the top node, `None` for terminals.
    pub fn root_var(&self) -> Option<VarId> {
        self.mgr.varid(self.root_level()?)
    }

    /// Negative cofactor with respect to the root variable.
    pub fn edge0(&self) -> Bdd<'m> {
        self.root_cofactors().0
    }

    /// Positive cofactor with respect to the root variable.
    pub fn edge1(&self) -> Bdd<'m> {
        self.root_cofactors().1
    }

    /// Both cofactors with respect to the root variable. Terminals are their own cofactors.
    pub fn root_cofactors(&self) -> (Bdd<'m>, Bdd<'m>) {
        let (e0, e1) = {
            let core = self.mgr.core.borrow();
            let level = core.table.level_of(self.edge);
            core.table.cofactors(self.edge, level)
        };
        (self.mgr.handle(e0), self.mgr.handle(e1))
    }

    /// Nested-bracket rendering: `@id:(var, then, else)`.
    pub fn to_bracket_string(&self) -> String {
        if self.is_zero() {
            return "(0)".to_string();
        } else if self.is_one() {
            return "(1)".to_string();
        } else if self.is_invalid() {
            return format!("({})", self.edge);
        }
        let (low, high) = self.root_cofactors();
        let var = self.root_var().map_or_else(|| "?".to_string(), |v| v.to_string());
        format!(
            "{}:({}, {}, {})",
            self.edge,
            var,
            high.to_bracket_string(),
            low.to_bracket_string()
        )
    }
}

impl BddMgr {
    /// Drops all registered substitutions.
    pub fn compose_start(&self) {
        self.core.borrow_mut().compose_start();
    }

    /// Registers `var := g` for the next [`compose`](Self::compose).
    ///
    /// Returns `false` (and registers nothing) if `var` is unknown or `g`
    /// belongs to another manager.
    pub fn compose_reg(&self, var: VarId, g: &Bdd<'_>) -> bool {
        if !g.belongs_to(self) {
            return false;
        }
        self.core.borrow_mut().compose_reg(var, g.edge)
    }

    /// Applies the registered substitutions to `f`.
    pub fn compose<'m>(&'m self, f: &Bdd<'m>) -> Bdd<'m> {
        if !f.belongs_to(self) {
            return self.make_error();
        }
        let f = f.edge;
        self.run(|core| {
            absorb(&[f])?;
            core.compose(f)
        })
    }
}

impl Clone for Bdd<'_> {
    fn clone(&self) -> Self {
        Bdd::new(self.mgr, self.edge)
    }
}

impl Drop for Bdd<'_> {
    fn drop(&mut self) {
        self.mgr.dec_root(self.edge);
    }
}

impl PartialEq for Bdd<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.mgr, other.mgr) && self.edge == other.edge
    }
}

impl Eq for Bdd<'_> {}

impl Hash for Bdd<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.edge.hash(state);
    }
}

impl Debug for Bdd<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Bdd").field(&self.edge).finish()
    }
}

impl Display for Bdd<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.edge)
    }
}
