//! Type-safe wrappers for variable identifiers and levels.
//!
//! A [`VarId`] names a decision variable chosen by the caller, a [`Level`] is
//! its current position in the variable order. The two are kept apart so that
//! level swaps never change what a caller means by "variable 3".
use std::fmt;

/// An external variable identifier.
///
/// Variable ids are picked by the client (parsers, mappers, ...) and are
/// independent of the position of the variable in the order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(u32);

impl VarId {
    /// Creates a variable id.
    pub const fn new(id: u32) -> Self {
        VarId(id)
    }

    /// Returns the raw id.
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<u32> for VarId {
    fn from(id: u32) -> Self {
        VarId(id)
    }
}

impl From<VarId> for u32 {
    fn from(var: VarId) -> Self {
        var.0
    }
}

/// A level in the variable ordering (0-indexed).
///
/// # Invariants
///
/// - Level 0 is the topmost level (closest to the roots)
/// - Levels increase towards the terminals
/// - [`Level::TERMINAL`] sits below every variable level
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Level(u32);

impl Level {
    /// Pseudo-level of the terminal edges, greater than any real level.
    pub const TERMINAL: Level = Level(u32::MAX);

    /// Creates a new level with the given index.
    pub const fn new(index: u32) -> Self {
        Level(index)
    }

    /// Returns the raw level index.
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns the next level down (index + 1).
    pub fn next(self) -> Self {
        debug_assert!(!self.is_terminal());
        Level(self.0 + 1)
    }

    /// Returns the next level down, or `None` past the last representable level.
    pub fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(index) if index != u32::MAX => Some(Level(index)),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_terminal() {
            write!(f, "L-")
        } else {
            write!(f, "L{}", self.0)
        }
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl From<u32> for Level {
    fn from(index: u32) -> Self {
        Level(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_creation() {
        let v0 = VarId::new(0);
        let v1 = VarId::from(1);
        assert_eq!(v0.id(), 0);
        assert_eq!(u32::from(v1), 1);
        assert!(v0 < v1);
        assert_eq!(v1.to_string(), "x1");
    }

    #[test]
    fn test_level_navigation() {
        let l0 = Level::new(0);
        let l1 = l0.next();

        assert_eq!(l1, Level::new(1));
        assert_eq!(l0.checked_next(), Some(l1));
        assert_eq!(Level::new(u32::MAX - 1).checked_next(), None);
        assert_eq!(Level::TERMINAL.checked_next(), None);
    }

    #[test]
    fn test_terminal_level_is_lowest() {
        assert!(Level::new(1_000_000) < Level::TERMINAL);
        assert!(Level::TERMINAL.is_terminal());
        assert_eq!(Level::TERMINAL.to_string(), "L-");
    }
}
