//! Garbage collection.
//!
//! Nodes are kept alive by the root counts that [`Bdd`](crate::Bdd) handles
//! maintain. A collection marks everything reachable from a node with a
//! non-zero root count, frees the rest and purges the caches.
//!
//! Collections run only between top-level operations: explicitly through
//! [`BddMgr::gc`], by the size policy at the start of an operation, or once
//! after an operation overflowed. The size policy collects when the table
//! outgrows the survivors of the last collection by `gc_growth`, or when
//! garbage makes up more than `gc_threshold` of a table larger than
//! `gc_node_limit` (see [`MgrParam`](crate::MgrParam)).

use log::{debug, info};

use crate::edge::NodeId;
use crate::mgr::{BddMgr, BinderId, MgrCore};

impl MgrCore {
    /// Nodes pinned by handles or by pending substitutions.
    pub(crate) fn roots(&self) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = self
            .table
            .iter()
            .filter(|(_, n)| n.root_count() > 0)
            .map(|(id, _)| id)
            .collect();
        roots.extend(self.compose_regs.iter().filter_map(|(_, g)| g.node_id()));
        roots
    }

    /// Mark and sweep. Returns the number of freed nodes.
    fn collect(&mut self, shrink: bool) -> usize {
        for id in self.roots() {
            self.table.mark_from(id);
        }
        let freed = self.table.sweep();
        self.clear_caches();
        if shrink && self.table.shrink() {
            self.clear_caches();
        }
        freed
    }

    /// Live nodes that no root reaches.
    pub(crate) fn garbage_num(&mut self) -> usize {
        let roots = self.roots();
        self.table.len() - self.table.count_reachable(&roots)
    }
}

impl BddMgr {
    /// Collects garbage, optionally shrinking the bucket array afterwards.
    ///
    /// Registered sweep binders run first. Does nothing and returns `false`
    /// while collection is disabled or already running.
    pub fn gc(&self, shrink: bool) -> bool {
        if self.gc_disabled.get() > 0 || self.gc_running.get() {
            debug!("Garbage collection skipped");
            return false;
        }
        self.gc_running.set(true);

        self.run_binders();

        let before = self.node_num();
        let (freed, live) = {
            let mut core = self.core.borrow_mut();
            let freed = core.collect(shrink);
            (freed, core.table.len())
        };
        self.gc_count.set(self.gc_count.get() + 1);
        self.gc_survivors.set(live);
        self.ratio_checked_at.set(live);
        self.gc_watermark.set(self.next_watermark());
        info!(
            "GC #{}: {} -> {} nodes ({} freed), next at {}",
            self.gc_count.get(),
            before,
            live,
            freed,
            self.gc_watermark.get()
        );

        self.gc_running.set(false);
        true
    }

    /// Binders are taken out of the manager while they run, so they may
    /// drop handles or register further binders.
    fn run_binders(&self) {
        let mut binders = self.binders.take();
        if !binders.is_empty() {
            debug!("Running {} sweep binders", binders.len());
        }
        for (_, binder) in binders.iter_mut() {
            binder(self);
        }
        let mut added = self.binders.replace(binders);
        self.binders.borrow_mut().append(&mut added);
    }

    /// Size policy, checked at the start of each top-level operation.
    pub(crate) fn maybe_gc(&self) {
        if !self.gc_allowed() {
            return;
        }
        let nodes = self.node_num();
        if nodes > self.gc_watermark.get() || self.garbage_ratio_exceeded(nodes) {
            self.gc(false);
        }
    }

    /// Whether garbage exceeds `gc_threshold` of the live nodes.
    ///
    /// Counting garbage scans the table, so it is redone only once the table
    /// has grown by `gc_threshold` since the previous count.
    fn garbage_ratio_exceeded(&self, nodes: usize) -> bool {
        let param = self.param.get();
        let last = self.ratio_checked_at.get();
        let step = ((last as f64 * param.gc_threshold) as usize).max(1);
        if nodes <= param.gc_node_limit || nodes < last.saturating_add(step) {
            return false;
        }
        self.ratio_checked_at.set(nodes);
        let garbage = self.garbage_num();
        debug!("Garbage ratio check: {} of {} nodes", garbage, nodes);
        garbage as f64 > nodes as f64 * param.gc_threshold
    }

    pub(crate) fn gc_allowed(&self) -> bool {
        self.gc_disabled.get() == 0 && !self.gc_running.get()
    }

    /// Undoes one [`disable_gc`](Self::disable_gc).
    pub fn enable_gc(&self) {
        self.gc_disabled.set(self.gc_disabled.get().saturating_sub(1));
    }

    /// Suspends collection until the matching [`enable_gc`](Self::enable_gc).
    pub fn disable_gc(&self) {
        self.gc_disabled.set(self.gc_disabled.get() + 1);
    }

    pub fn gc_enabled(&self) -> bool {
        self.gc_disabled.get() == 0
    }

    /// Registers a callback invoked at the start of every collection.
    ///
    /// Binders run in registration order, before anything is marked, and
    /// receive the manager. A typical binder purges an external table that
    /// keeps raw [`Edge`](crate::Edge)s of this manager without rooting
    /// them, since those nodes may be freed by the sweep.
    pub fn reg_sweep_binder(&self, binder: impl FnMut(&BddMgr) + 'static) -> BinderId {
        let id = BinderId(self.next_binder.get());
        self.next_binder.set(id.0 + 1);
        self.binders.borrow_mut().push((id, Box::new(binder)));
        id
    }

    /// Removes a binder. Returns `false` if `id` is not registered.
    ///
    /// A binder cannot remove itself (or any other binder) while running.
    pub fn unreg_sweep_binder(&self, id: BinderId) -> bool {
        let mut binders = self.binders.borrow_mut();
        match binders.iter().position(|(b, _)| *b == id) {
            Some(pos) => {
                binders.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of live nodes that no handle reaches, i.e. what a collection would free.
    pub fn garbage_num(&self) -> usize {
        self.core.borrow_mut().garbage_num()
    }
}
