//! Error types.
//!
//! The engine itself reports failure through the `Error` and `Overflow`
//! sentinel edges; [`Invalid`] is the same information in `Result` form.
//! Serialization and level swapping have their own error enums.

use std::fmt;
use std::io;

use crate::edge::Edge;

/// A failed Boolean operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Invalid {
    /// Invalid operation (e.g. handles of different managers were mixed).
    Error,
    /// The node table could not grow any further.
    Overflow,
}

impl Invalid {
    /// Returns the failure an edge denotes, if it is a sentinel.
    pub fn of(edge: Edge) -> Option<Invalid> {
        match edge {
            Edge::Error => Some(Invalid::Error),
            Edge::Overflow => Some(Invalid::Overflow),
            _ => None,
        }
    }
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invalid::Error => write!(f, "invalid BDD operation"),
            Invalid::Overflow => write!(f, "BDD node table overflow"),
        }
    }
}

impl std::error::Error for Invalid {}

impl From<Invalid> for Edge {
    fn from(value: Invalid) -> Self {
        match value {
            Invalid::Error => Edge::Error,
            Invalid::Overflow => Edge::Overflow,
        }
    }
}

/// Failure while writing a function out.
#[derive(Debug)]
pub enum DumpError {
    Io(io::Error),
    /// The function is `Error` or `Overflow`.
    Invalid(Invalid),
    /// The support is larger than a truth table can hold.
    TooManyVars { count: usize, max: usize },
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpError::Io(e) => write!(f, "I/O error: {}", e),
            DumpError::Invalid(e) => write!(f, "cannot dump: {}", e),
            DumpError::TooManyVars { count, max } => {
                write!(f, "support has {} variables, at most {} can be dumped", count, max)
            }
        }
    }
}

impl std::error::Error for DumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DumpError::Io(e) => Some(e),
            DumpError::Invalid(e) => Some(e),
            DumpError::TooManyVars { .. } => None,
        }
    }
}

impl From<io::Error> for DumpError {
    fn from(value: io::Error) -> Self {
        DumpError::Io(value)
    }
}

impl From<Invalid> for DumpError {
    fn from(value: Invalid) -> Self {
        DumpError::Invalid(value)
    }
}

/// Failure while reading a function back.
#[derive(Debug)]
pub enum RestoreError {
    Io(io::Error),
    BadMagic([u8; 4]),
    /// The packed value does not encode an edge.
    BadEdge(u64),
    /// The edge points at a slot that holds no live node.
    DanglingNode(u64),
    TooManyVars { count: usize, max: usize },
    /// Rebuilding the function failed inside the manager.
    Invalid(Invalid),
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreError::Io(e) => write!(f, "I/O error: {}", e),
            RestoreError::BadMagic(m) => write!(f, "bad truth table magic {:?}", m),
            RestoreError::BadEdge(raw) => write!(f, "value {:#x} is not an edge", raw),
            RestoreError::DanglingNode(raw) => write!(f, "edge {:#x} points at no live node", raw),
            RestoreError::TooManyVars { count, max } => {
                write!(f, "truth table over {} variables, at most {} supported", count, max)
            }
            RestoreError::Invalid(e) => write!(f, "cannot restore: {}", e),
        }
    }
}

impl std::error::Error for RestoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RestoreError::Io(e) => Some(e),
            RestoreError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RestoreError {
    fn from(value: io::Error) -> Self {
        RestoreError::Io(value)
    }
}

impl From<Invalid> for RestoreError {
    fn from(value: Invalid) -> Self {
        RestoreError::Invalid(value)
    }
}

/// Refused level swap. Nothing is changed when this is returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SwapError {
    /// Dynamic variable ordering is disabled.
    DvoDisabled,
    /// There is no level below the given one.
    NoSuchLevel(u32),
    /// Not enough free node slots for the restructured nodes.
    Overflow,
}

impl fmt::Display for SwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapError::DvoDisabled => write!(f, "dynamic variable ordering is disabled"),
            SwapError::NoSuchLevel(l) => write!(f, "cannot swap level {} with the level below", l),
            SwapError::Overflow => write!(f, "not enough free nodes to swap levels"),
        }
    }
}

impl std::error::Error for SwapError {}

/// Malformed expression text.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParseError {
    /// Byte offset where the problem was noticed, if known.
    pub position: Option<usize>,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            position: None,
            message: message.into(),
        }
    }

    pub(crate) fn at(position: usize, message: impl Into<String>) -> Self {
        Self {
            position: Some(position),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "parse error at {}: {}", pos, self.message),
            None => write!(f, "parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}
