//! # bdd-mgr: a canonical BDD manager with complement edges
//!
//! **`bdd-mgr`** represents Boolean functions as reduced ordered binary
//! decision diagrams. It is meant as the function-representation core of
//! logic synthesis and verification tools: every function built in a
//! manager has exactly one node graph, so equivalence is a pointer
//! comparison.
//!
//! ## What is in a manager?
//!
//! - **Unique table**: hash-consed nodes `(level, else, then)`. The else edge
//!   of a stored node is never complemented, which makes complement edges
//!   canonical and negation free.
//! - **Computed tables**: direct-mapped caches for AND, XOR, ITE, cofactor
//!   and compose results.
//! - **Roots and GC**: [`Bdd`] handles are reference-counted roots. A mark
//!   and sweep collector frees everything no handle reaches.
//! - **Variable order**: a bijection between variable ids and levels, with
//!   an in-place swap of adjacent levels.
//!
//! Failures are values: an operation that mixes managers yields an `Error`
//! function, one that runs out of nodes yields `Overflow`. Both absorb
//! every later operation they take part in.
//!
//! ## Basic Usage
//!
//! ```rust
//! use bdd_mgr::{BddMgr, VarId};
//!
//! // 1. Create a manager
//! let mgr = BddMgr::default();
//!
//! // 2. Literals register their variables on first use
//! let x = mgr.make_posiliteral(VarId::new(0));
//! let y = mgr.make_posiliteral(VarId::new(1));
//!
//! // 3. Build f = x AND (NOT y)
//! let f = &x & &!&y;
//!
//! // 4. Canonicity: the same function is the same handle
//! assert_eq!(f, !(!&x | &y));
//! assert!(f.implies(&x));
//!
//! // 5. Evaluate at (x=1, y=0)
//! assert_eq!(f.eval(|v| v == VarId::new(0)), Some(true));
//! ```
//!
//! ## Core Components
//!
//! - **[`mgr`]**: the [`BddMgr`] manager, its configuration and statistics.
//! - **[`bdd`]**: the [`Bdd`] root handle; operators live in [`ops`].
//! - **[`build`]**: cubes, truth tables, threshold functions, [`expr`] import.
//! - **[`sat`]**, **[`paths`]**: counting, support, evaluation, single paths.
//! - **[`gc`]**, **[`reorder`]**: collection and level swapping.
//! - **[`serial`]**, **[`dot`]**: dump/restore and Graphviz export.

pub mod apply;
pub mod bdd;
pub mod build;
pub mod cache;
pub mod config;
pub mod dot;
pub mod edge;
pub mod error;
pub mod expr;
pub mod gc;
pub mod mgr;
pub mod node;
pub mod ops;
pub mod paths;
pub mod reorder;
pub mod sat;
pub mod serial;
pub mod table;
pub mod types;
pub mod utils;
pub mod vars;

pub use apply::BinOp;
pub use bdd::Bdd;
pub use cache::CacheStats;
pub use config::{MgrConfig, MgrParam};
pub use dot::DotConfig;
pub use edge::{Edge, NodeId};
pub use error::{DumpError, Invalid, ParseError, RestoreError, SwapError};
pub use expr::{parse_expr, Expr};
pub use mgr::{BddMgr, BinderId};
pub use types::{Level, VarId};
