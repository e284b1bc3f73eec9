//! Operator overloads on [`Bdd`] handles.
//!
//! `&`, `|`, `^` and `!` work on owned handles and references alike; the
//! `*Assign` forms replace the left-hand handle.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::apply::BinOp;
use crate::bdd::Bdd;

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:expr) => {
        impl<'m> $trait<&Bdd<'m>> for &Bdd<'m> {
            type Output = Bdd<'m>;

            fn $method(self, rhs: &Bdd<'m>) -> Self::Output {
                self.apply($op, rhs)
            }
        }

        impl<'m> $trait<Bdd<'m>> for &Bdd<'m> {
            type Output = Bdd<'m>;

            fn $method(self, rhs: Bdd<'m>) -> Self::Output {
                self.apply($op, &rhs)
            }
        }

        impl<'m> $trait<&Bdd<'m>> for Bdd<'m> {
            type Output = Bdd<'m>;

            fn $method(self, rhs: &Bdd<'m>) -> Self::Output {
                self.apply($op, rhs)
            }
        }

        impl<'m> $trait<Bdd<'m>> for Bdd<'m> {
            type Output = Bdd<'m>;

            fn $method(self, rhs: Bdd<'m>) -> Self::Output {
                self.apply($op, &rhs)
            }
        }

        impl<'m> $assign_trait<&Bdd<'m>> for Bdd<'m> {
            fn $assign_method(&mut self, rhs: &Bdd<'m>) {
                *self = self.apply($op, rhs);
            }
        }

        impl<'m> $assign_trait<Bdd<'m>> for Bdd<'m> {
            fn $assign_method(&mut self, rhs: Bdd<'m>) {
                *self = self.apply($op, &rhs);
            }
        }
    };
}

impl_binop!(BitAnd, bitand, BitAndAssign, bitand_assign, BinOp::And);
impl_binop!(BitOr, bitor, BitOrAssign, bitor_assign, BinOp::Or);
impl_binop!(BitXor, bitxor, BitXorAssign, bitxor_assign, BinOp::Xor);

impl<'m> Not for &Bdd<'m> {
    type Output = Bdd<'m>;

    fn not(self) -> Self::Output {
        self.mgr().handle(-self.edge())
    }
}

impl<'m> Not for Bdd<'m> {
    type Output = Bdd<'m>;

    fn not(mut self) -> Self::Output {
        self.negate();
        self
    }
}
