use std::cell::{Cell, RefCell};
use std::fmt::Debug;

use log::{debug, warn};

use crate::bdd::Bdd;
use crate::cache::{CacheStats, DirectMappedCache, Key2, Key3};
use crate::config::{MgrConfig, MgrParam};
use crate::edge::Edge;
use crate::error::Invalid;
use crate::table::NodeTable;
use crate::types::{Level, VarId};
use crate::vars::VarTable;

/// Result of an internal operation: the edge, or why there is none.
pub(crate) type Res<T = Edge> = Result<T, Invalid>;

/// Callback run at the start of every collection.
pub(crate) type SweepBinder = Box<dyn FnMut(&BddMgr)>;

/// Identifies a registered sweep binder.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BinderId(pub(crate) u64);

/// Mutable state of a manager: everything the engine touches during one operation.
pub(crate) struct MgrCore {
    pub(crate) table: NodeTable,
    pub(crate) vars: VarTable,
    pub(crate) cache2: DirectMappedCache<Key2, Edge>,
    pub(crate) cache3: DirectMappedCache<Key3, Edge>,
    pub(crate) compose_cache: DirectMappedCache<Edge, Edge>,
    /// Pending substitutions, pinned as roots until the next `compose_start`.
    pub(crate) compose_regs: Vec<(VarId, Edge)>,
    seen_resizes: usize,
}

impl MgrCore {
    fn new(config: &MgrConfig) -> Self {
        Self {
            table: NodeTable::new(config.initial_table_size, config.max_nodes, config.load_limit),
            vars: VarTable::new(config.max_vars),
            cache2: DirectMappedCache::new(config.cache_bits),
            cache3: DirectMappedCache::new(config.cache_bits),
            compose_cache: DirectMappedCache::new(config.cache_bits.saturating_sub(2)),
            compose_regs: Vec::new(),
            seen_resizes: 0,
        }
    }

    pub(crate) fn clear_caches(&mut self) {
        self.cache2.clear();
        self.cache3.clear();
        self.compose_cache.clear();
    }

    /// Canonical node for `level ? e1 : e0`, as a `Result`.
    pub(crate) fn new_node(&mut self, level: Level, e0: Edge, e1: Edge) -> Res {
        let e = self.table.get_or_create(level, e0, e1);
        if self.table.resize_count() != self.seen_resizes {
            self.seen_resizes = self.table.resize_count();
            self.clear_caches();
        }
        check(e)
    }

    pub(crate) fn inc_root(&mut self, e: Edge) {
        if let Some(id) = e.node_id() {
            self.table.node_mut(id).inc_root();
        }
    }

    pub(crate) fn dec_root(&mut self, e: Edge) {
        if let Some(id) = e.node_id() {
            self.table.node_mut(id).dec_root();
        }
    }

    /// Literal at `level`.
    pub(crate) fn literal(&mut self, level: Level, pol: bool) -> Res {
        Ok(self.new_node(level, Edge::Zero, Edge::One)?.negate_if(!pol))
    }

    /// Literal of `var`, registering the variable if needed.
    pub(crate) fn var_literal(&mut self, var: VarId, pol: bool) -> Res {
        if !self.vars.new_var(var) {
            warn!("Cannot register {}: variable limit reached", var);
            return Err(Invalid::Overflow);
        }
        let level = self.vars.level(var).ok_or(Invalid::Error)?;
        self.literal(level, pol)
    }

    pub(crate) fn used_mem(&self) -> usize {
        self.table.used_mem()
            + self.vars.used_mem()
            + self.cache2.used_mem()
            + self.cache3.used_mem()
            + self.compose_cache.used_mem()
    }
}

/// `Err` for the sentinel edges, `Ok` for everything else.
pub(crate) fn check(e: Edge) -> Res {
    match Invalid::of(e) {
        Some(invalid) => Err(invalid),
        None => Ok(e),
    }
}

/// Fails if any edge is a sentinel; `Error` takes precedence over `Overflow`.
pub(crate) fn absorb(edges: &[Edge]) -> Res<()> {
    if edges.iter().any(|e| e.is_error()) {
        return Err(Invalid::Error);
    }
    if edges.iter().any(|e| e.is_overflow()) {
        return Err(Invalid::Overflow);
    }
    Ok(())
}

/// A BDD manager.
///
/// Owns the node table, the operation caches, the variable order and the
/// root set. Functions are handed out as [`Bdd`] handles that borrow the
/// manager; the nodes they reach survive every garbage collection.
///
/// ```
/// use bdd_mgr::{BddMgr, VarId};
///
/// let mgr = BddMgr::default();
/// let x = mgr.make_posiliteral(VarId::new(0));
/// let y = mgr.make_posiliteral(VarId::new(1));
/// let f = &x & &y;
/// assert!(f.implies(&x));
/// assert_eq!(f, !(!&x | !&y));
/// ```
pub struct BddMgr {
    pub(crate) core: RefCell<MgrCore>,
    pub(crate) binders: RefCell<Vec<(BinderId, SweepBinder)>>,
    pub(crate) next_binder: Cell<u64>,
    pub(crate) gc_disabled: Cell<u32>,
    pub(crate) gc_running: Cell<bool>,
    pub(crate) gc_count: Cell<usize>,
    /// Node count above which the next automatic collection may run.
    pub(crate) gc_watermark: Cell<usize>,
    /// Live nodes after the last collection.
    pub(crate) gc_survivors: Cell<usize>,
    /// Node count at the last garbage-ratio scan.
    pub(crate) ratio_checked_at: Cell<usize>,
    pub(crate) param: Cell<MgrParam>,
    dvo: Cell<bool>,
    config: MgrConfig,
}

impl BddMgr {
    pub fn new(config: MgrConfig) -> Self {
        let config = config.sanitized();
        debug!("Creating BDD manager '{}': {:?}", config.name, config);
        Self {
            core: RefCell::new(MgrCore::new(&config)),
            binders: RefCell::new(Vec::new()),
            next_binder: Cell::new(0),
            gc_disabled: Cell::new(if config.gc_enabled { 0 } else { 1 }),
            gc_running: Cell::new(false),
            gc_count: Cell::new(0),
            gc_watermark: Cell::new(config.gc_node_limit),
            gc_survivors: Cell::new(0),
            ratio_checked_at: Cell::new(0),
            param: Cell::new(config.param()),
            dvo: Cell::new(config.dvo_enabled),
            config,
        }
    }
}

impl Default for BddMgr {
    fn default() -> Self {
        BddMgr::new(MgrConfig::default())
    }
}

impl Debug for BddMgr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("BddMgr")
            .field("name", &self.config.name)
            .field("vars", &core.vars.len())
            .field("nodes", &core.table.len())
            .field("avail", &core.table.avail())
            .field("buckets", &core.table.bucket_count())
            .field("gc_count", &self.gc_count.get())
            .finish()
    }
}

impl BddMgr {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Configuration the manager was created with. Limits changed later
    /// through [`set_param`](Self::set_param) are reported by [`param`](Self::param).
    pub fn config(&self) -> &MgrConfig {
        &self.config
    }

    /// Current collection and table limits.
    pub fn param(&self) -> MgrParam {
        self.param.get()
    }

    /// Changes collection and table limits on the fly.
    ///
    /// Out-of-range values fall back to their defaults. Lowering `max_nodes`
    /// below the current node count frees nothing; further allocations fail
    /// until enough garbage is collected.
    pub fn set_param(&self, param: MgrParam) {
        let param = param.sanitized();
        debug!("Setting parameters of '{}': {:?}", self.config.name, param);
        {
            let mut core = self.core.borrow_mut();
            core.table.set_max_nodes(param.max_nodes);
            core.table.set_load_limit(param.load_limit);
        }
        self.param.set(param);
        self.gc_watermark.set(self.next_watermark());
    }

    /// Node count that triggers the next automatic collection.
    pub(crate) fn next_watermark(&self) -> usize {
        let param = self.param.get();
        let grown = (self.gc_survivors.get() as f64 * (1.0 + param.gc_growth)) as usize;
        grown.max(param.gc_node_limit)
    }

    pub(crate) fn inc_root(&self, e: Edge) {
        if e.is_node() {
            self.core.borrow_mut().inc_root(e);
        }
    }

    pub(crate) fn dec_root(&self, e: Edge) {
        if e.is_node() {
            self.core.borrow_mut().dec_root(e);
        }
    }

    /// Runs a top-level operation and wraps its result in a handle.
    ///
    /// The size policy may collect garbage before the operation. If the
    /// operation overflows and collection is allowed, garbage is collected
    /// and the operation is retried once.
    pub(crate) fn run<F>(&self, op: F) -> Bdd<'_>
    where
        F: Fn(&mut MgrCore) -> Res,
    {
        self.maybe_gc();
        let mut result = op(&mut *self.core.borrow_mut());
        if result == Err(Invalid::Overflow) && self.gc_allowed() {
            warn!("Node table overflow, collecting garbage and retrying");
            self.gc(false);
            result = op(&mut *self.core.borrow_mut());
        }
        let edge = match result {
            Ok(e) => e,
            Err(invalid) => {
                if invalid == Invalid::Overflow {
                    warn!("Operation failed: {}", invalid);
                }
                invalid.into()
            }
        };
        Bdd::new(self, edge)
    }

    /// Returns a handle for an edge of this manager.
    pub(crate) fn handle(&self, edge: Edge) -> Bdd<'_> {
        Bdd::new(self, edge)
    }

    pub fn make_zero(&self) -> Bdd<'_> {
        self.handle(Edge::Zero)
    }

    pub fn make_one(&self) -> Bdd<'_> {
        self.handle(Edge::One)
    }

    pub fn make_error(&self) -> Bdd<'_> {
        self.handle(Edge::Error)
    }

    pub fn make_overflow(&self) -> Bdd<'_> {
        self.handle(Edge::Overflow)
    }

    /// Literal `var` (or `~var` when `pol` is false). Registers `var` if it is new.
    pub fn make_literal(&self, var: VarId, pol: bool) -> Bdd<'_> {
        self.run(|core| core.var_literal(var, pol))
    }

    pub fn make_posiliteral(&self, var: VarId) -> Bdd<'_> {
        self.make_literal(var, true)
    }

    pub fn make_negaliteral(&self, var: VarId) -> Bdd<'_> {
        self.make_literal(var, false)
    }

    /// `var ? chd1 : chd0`, for any variable order.
    pub fn make_bdd<'m>(&'m self, var: VarId, chd0: &Bdd<'m>, chd1: &Bdd<'m>) -> Bdd<'m> {
        if !chd0.belongs_to(self) || !chd1.belongs_to(self) {
            return self.make_error();
        }
        let (e0, e1) = (chd0.edge(), chd1.edge());
        self.run(|core| {
            absorb(&[e0, e1])?;
            let lit = core.var_literal(var, true)?;
            core.ite(lit, e1, e0)
        })
    }

    /// Registers `var` at the bottom of the order.
    ///
    /// Returns `false` only if the variable limit is reached.
    pub fn new_var(&self, var: VarId) -> bool {
        self.core.borrow_mut().vars.new_var(var)
    }

    pub fn level(&self, var: VarId) -> Option<Level> {
        self.core.borrow().vars.level(var)
    }

    pub fn varid(&self, level: Level) -> Option<VarId> {
        self.core.borrow().vars.varid(level)
    }

    /// Registered variables in level order.
    pub fn var_list(&self) -> Vec<VarId> {
        self.core.borrow().vars.var_list().to_vec()
    }

    /// Number of levels in use.
    pub fn max_level(&self) -> u32 {
        self.core.borrow().vars.len() as u32
    }

    /// Number of live nodes in the table.
    pub fn node_num(&self) -> usize {
        self.core.borrow().table.len()
    }

    /// Number of free slots ready for reuse.
    pub fn avail_num(&self) -> usize {
        self.core.borrow().table.avail()
    }

    pub fn gc_count(&self) -> usize {
        self.gc_count.get()
    }

    /// Bytes held by the table, caches and variable table.
    pub fn used_mem(&self) -> usize {
        self.core.borrow().used_mem()
    }

    pub fn cache_stats(&self) -> CacheStats {
        let core = self.core.borrow();
        CacheStats::default()
            .add(&core.cache2)
            .add(&core.cache3)
            .add(&core.compose_cache)
    }

    /// Drops every cached operation result.
    pub fn clear_cache(&self) {
        self.core.borrow_mut().clear_caches();
    }

    pub fn enable_dvo(&self) {
        self.dvo.set(true);
    }

    pub fn disable_dvo(&self) {
        self.dvo.set(false);
    }

    pub fn dvo_enabled(&self) -> bool {
        self.dvo.get()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_literals() {
        let mgr = BddMgr::default();
        let x = mgr.make_posiliteral(VarId::new(5));
        let nx = mgr.make_negaliteral(VarId::new(5));
        assert_eq!(x.edge(), -nx.edge());
        assert_eq!(mgr.node_num(), 1);
        assert_eq!(mgr.level(VarId::new(5)), Some(Level::new(0)));
        assert_eq!(mgr.max_level(), 1);
    }

    #[test]
    fn test_make_bdd() {
        let mgr = BddMgr::default();
        let a = mgr.make_posiliteral(VarId::new(0));
        let b = mgr.make_posiliteral(VarId::new(1));
        let f = mgr.make_bdd(VarId::new(2), &a, &b);
        let c = mgr.make_posiliteral(VarId::new(2));
        assert_eq!(f, c.ite(&b, &a));
    }

    #[test]
    fn test_var_registration() {
        let mgr = BddMgr::new(MgrConfig::default().with_max_vars(2));
        assert!(mgr.new_var(VarId::new(10)));
        assert!(mgr.new_var(VarId::new(20)));
        assert!(!mgr.new_var(VarId::new(30)));
        assert_eq!(mgr.var_list(), vec![VarId::new(10), VarId::new(20)]);
        assert_eq!(mgr.varid(Level::new(1)), Some(VarId::new(20)));
        assert!(mgr.make_posiliteral(VarId::new(30)).is_overflow());
    }

    #[test]
    fn test_absorb_precedence() {
        assert_eq!(absorb(&[Edge::Overflow, Edge::Error]), Err(Invalid::Error));
        assert_eq!(absorb(&[Edge::One, Edge::Overflow]), Err(Invalid::Overflow));
        assert_eq!(absorb(&[Edge::One, Edge::Zero]), Ok(()));
    }

    #[test]
    fn test_debug_and_stats() {
        let mgr = BddMgr::new(MgrConfig::default().with_name("test"));
        let _x = mgr.make_posiliteral(VarId::new(0));
        assert_eq!(mgr.name(), "test");
        assert!(format!("{:?}", mgr).contains("nodes: 1"));
        assert!(mgr.used_mem() > 0);
        assert!(mgr.cache_stats().capacity > 0);
    }

    #[test]
    fn test_set_param() {
        let mgr = BddMgr::default();
        let mut param = mgr.param();
        assert_eq!(param, MgrConfig::default().param());

        param.max_nodes = 8;
        param.load_limit = -1.0;
        mgr.set_param(param);
        assert_eq!(mgr.param().max_nodes, 8);
        assert_eq!(mgr.param().load_limit, 2.0);
        assert!(mgr.make_thfunc(8, 4).is_overflow());

        // Raising the limit lets the same manager build the function.
        param.max_nodes = 1 << 16;
        mgr.set_param(param);
        let f = mgr.make_thfunc(8, 4);
        assert!(!f.is_invalid());
        assert_eq!(f.support().len(), 8);
        assert_eq!(mgr.config().max_nodes, MgrConfig::default().max_nodes);
    }

    #[test]
    fn test_set_param_moves_watermark() {
        let mgr = BddMgr::default();
        let x: Vec<_> = (0..6).map(|i| mgr.make_posiliteral(VarId::new(i))).collect();
        let _f = &(&x[0] & &x[1]) | &(&x[2] ^ &x[3]);
        assert_eq!(mgr.gc_count(), 0);

        let mut param = mgr.param();
        param.gc_node_limit = 0;
        param.gc_growth = 0.0;
        mgr.set_param(param);
        let _g = &x[4] | &x[5];
        assert_eq!(mgr.gc_count(), 1);
    }
}
