//! Manager configuration.

use crate::edge::NodeId;

/// Tuning knobs of a [`BddMgr`](crate::BddMgr).
///
/// ```
/// use bdd_mgr::MgrConfig;
///
/// let config = MgrConfig::default().with_max_nodes(1 << 16).with_cache_bits(12);
/// assert_eq!(config.max_nodes, 1 << 16);
/// ```
#[derive(Debug, Clone)]
pub struct MgrConfig {
    /// Name reported in statistics and logs.
    pub name: String,
    /// Initial number of hash buckets (rounded up to a power of two).
    pub initial_table_size: usize,
    /// Hard limit on the number of node slots; beyond it operations return Overflow.
    pub max_nodes: usize,
    /// Each operation cache has `2^cache_bits` slots.
    pub cache_bits: usize,
    /// Average chain length that triggers a table resize.
    pub load_limit: f64,
    pub gc_enabled: bool,
    /// Share of garbage among live nodes above which a collection runs.
    pub gc_threshold: f64,
    /// No automatic collection happens while the table holds fewer nodes.
    pub gc_node_limit: usize,
    /// Growth factor over the survivors of the last collection before the next one.
    pub gc_growth: f64,
    pub dvo_enabled: bool,
    pub max_vars: usize,
}

impl Default for MgrConfig {
    fn default() -> Self {
        Self {
            name: "bdd_mgr".to_string(),
            initial_table_size: 1024,
            max_nodes: 1 << 24,
            cache_bits: 14,
            load_limit: 2.0,
            gc_enabled: true,
            gc_threshold: 0.1,
            gc_node_limit: 64 * 1024,
            gc_growth: 1.0,
            dvo_enabled: false,
            max_vars: 1 << 20,
        }
    }
}

impl MgrConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_initial_table_size(mut self, size: usize) -> Self {
        self.initial_table_size = size;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_cache_bits(mut self, bits: usize) -> Self {
        self.cache_bits = bits;
        self
    }

    pub fn with_load_limit(mut self, load_limit: f64) -> Self {
        self.load_limit = load_limit;
        self
    }

    pub fn with_gc(mut self, enabled: bool) -> Self {
        self.gc_enabled = enabled;
        self
    }

    pub fn with_gc_threshold(mut self, threshold: f64) -> Self {
        self.gc_threshold = threshold;
        self
    }

    pub fn with_gc_node_limit(mut self, limit: usize) -> Self {
        self.gc_node_limit = limit;
        self
    }

    pub fn with_gc_growth(mut self, growth: f64) -> Self {
        self.gc_growth = growth;
        self
    }

    pub fn with_dvo(mut self, enabled: bool) -> Self {
        self.dvo_enabled = enabled;
        self
    }

    pub fn with_max_vars(mut self, max_vars: usize) -> Self {
        self.max_vars = max_vars;
        self
    }

    /// The runtime-adjustable part of the configuration.
    pub fn param(&self) -> MgrParam {
        MgrParam {
            gc_threshold: self.gc_threshold,
            gc_node_limit: self.gc_node_limit,
            gc_growth: self.gc_growth,
            load_limit: self.load_limit,
            max_nodes: self.max_nodes,
        }
    }

    /// Clamps out-of-range values.
    pub(crate) fn sanitized(mut self) -> Self {
        self.initial_table_size = self.initial_table_size.clamp(16, 1 << 30).next_power_of_two();
        self.cache_bits = self.cache_bits.min(30);
        let param = self.param().sanitized();
        self.gc_threshold = param.gc_threshold;
        self.gc_growth = param.gc_growth;
        self.load_limit = param.load_limit;
        self.max_nodes = param.max_nodes;
        self
    }
}

/// Collection and table limits that can be changed on a live manager
/// through [`BddMgr::set_param`](crate::BddMgr::set_param).
///
/// ```
/// use bdd_mgr::{BddMgr, VarId};
///
/// let mgr = BddMgr::default();
/// let mut param = mgr.param();
/// param.max_nodes = 2;
/// mgr.set_param(param);
/// assert!(mgr.make_thfunc(4, 2).is_overflow());
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MgrParam {
    /// Share of garbage among live nodes above which a collection runs.
    pub gc_threshold: f64,
    /// No automatic collection happens while the table holds fewer nodes.
    pub gc_node_limit: usize,
    /// Growth factor over the survivors of the last collection before the next one.
    pub gc_growth: f64,
    /// Average chain length that triggers a table resize.
    pub load_limit: f64,
    /// Hard limit on the number of node slots.
    pub max_nodes: usize,
}

impl MgrParam {
    /// Replaces out-of-range values by their defaults.
    pub(crate) fn sanitized(mut self) -> Self {
        let defaults = MgrConfig::default();
        self.max_nodes = self.max_nodes.min(NodeId::MAX as usize + 1);
        if self.load_limit.is_nan() || self.load_limit <= 0.0 {
            self.load_limit = defaults.load_limit;
        }
        if self.gc_growth.is_nan() || self.gc_growth < 0.0 {
            self.gc_growth = defaults.gc_growth;
        }
        if self.gc_threshold.is_nan() || self.gc_threshold <= 0.0 {
            self.gc_threshold = defaults.gc_threshold;
        }
        self
    }
}
