//! DOT (Graphviz) export, for looking at diagrams while debugging.
//!
//! - Terminals are boxes at the bottom (sink rank).
//! - Nodes of one level share a rank and are labeled with their variable.
//! - Then-edges are solid, else-edges dashed.
//! - A complemented edge ends in a hollow circle. Only then-edges and
//!   roots can be complemented, else-edges never are.
//! - Roots are boxes at the top (source rank).
//!
//! ```
//! use bdd_mgr::{BddMgr, VarId};
//!
//! let mgr = BddMgr::default();
//! let x = mgr.make_posiliteral(VarId::new(1));
//! let y = mgr.make_posiliteral(VarId::new(2));
//! let dot = mgr.to_dot(&[&(&x & &y), &(&x ^ &y)]).unwrap();
//! assert!(dot.starts_with("digraph"));
//! // Render with: dot -Tpng out.dot -o out.png
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::bdd::Bdd;
use crate::edge::{Edge, NodeId};
use crate::mgr::BddMgr;
use crate::types::Level;

#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for internal nodes (default: "circle")
    pub node_shape: &'static str,
    /// Shape for terminals (default: "square")
    pub terminal_shape: &'static str,
    /// Shape for roots (default: "rect")
    pub root_shape: &'static str,
    pub then_edge_style: &'static str,
    pub else_edge_style: &'static str,
    /// Whether to print variables as `x<sub>i</sub>` (default: true)
    pub use_html_labels: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            terminal_shape: "square",
            root_shape: "rect",
            then_edge_style: "solid",
            else_edge_style: "dashed",
            use_html_labels: true,
        }
    }
}

/// Target of an edge: `Zero` is drawn as its own terminal.
fn target(e: Edge) -> (String, bool) {
    match e {
        Edge::Zero => ("t0".to_string(), false),
        Edge::One => ("t1".to_string(), false),
        Edge::Node(id, c) => (format!("n{}", id.raw()), c),
        Edge::Error => ("tE".to_string(), false),
        Edge::Overflow => ("tO".to_string(), false),
    }
}

impl BddMgr {
    pub fn to_dot(&self, roots: &[&Bdd<'_>]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    pub fn to_dot_with_config(&self, roots: &[&Bdd<'_>], config: &DotConfig) -> Result<String, std::fmt::Error> {
        let edges: Vec<Edge> = roots
            .iter()
            .map(|f| if f.belongs_to(self) { f.edge() } else { Edge::Error })
            .collect();
        let ids: Vec<NodeId> = edges.iter().filter_map(|e| e.node_id()).collect();

        let mut core = self.core.borrow_mut();
        let nodes = core.table.scan(&ids);
        for &id in &nodes {
            core.table.node_mut(id).set_scan_mark(false);
        }

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}, fixedsize=true];", config.node_shape)?;

        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "t0 [shape={}, label=\"0\"];", config.terminal_shape)?;
        writeln!(dot, "t1 [shape={}, label=\"1\"];", config.terminal_shape)?;
        if edges.contains(&Edge::Error) {
            writeln!(dot, "tE [shape={}, label=\"E\"];", config.terminal_shape)?;
        }
        if edges.contains(&Edge::Overflow) {
            writeln!(dot, "tO [shape={}, label=\"O\"];", config.terminal_shape)?;
        }
        writeln!(dot, "}}")?;

        let mut levels = BTreeMap::<Level, Vec<NodeId>>::new();
        for &id in &nodes {
            levels.entry(core.table.node(id).level).or_default().push(id);
        }
        for (&level, ids) in &levels {
            writeln!(dot, "{{ rank=same")?;
            let var = core.vars.varid(level).map_or_else(|| "?".to_string(), |v| v.id().to_string());
            for id in ids {
                let label = if config.use_html_labels {
                    format!("<x<SUB>{}</SUB>>", var)
                } else {
                    format!("\"x{}\"", var)
                };
                writeln!(dot, "n{} [label={}];", id.raw(), label)?;
            }
            writeln!(dot, "}}")?;
        }

        for &id in &nodes {
            let node = core.table.node(id);
            let (high, complemented) = target(node.e1);
            let arrow = if complemented { "odot" } else { "normal" };
            writeln!(
                dot,
                "n{} -> {} [style={}, arrowhead={}];",
                id.raw(),
                high,
                config.then_edge_style,
                arrow
            )?;
            let (low, _) = target(node.e0);
            writeln!(dot, "n{} -> {} [style={}];", id.raw(), low, config.else_edge_style)?;
        }

        writeln!(dot, "{{ rank=source")?;
        for (i, e) in edges.iter().enumerate() {
            writeln!(dot, "r{} [shape={}, label=\"{}\"];", i, config.root_shape, e)?;
        }
        writeln!(dot, "}}")?;
        for (i, &e) in edges.iter().enumerate() {
            let (to, complemented) = target(e);
            if complemented {
                writeln!(dot, "r{} -> {} [arrowhead=odot];", i, to)?;
            } else {
                writeln!(dot, "r{} -> {};", i, to)?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::types::VarId;

    use super::*;

    #[test]
    fn test_to_dot_basic() {
        let mgr = BddMgr::default();
        let x = mgr.make_posiliteral(VarId::new(1));
        let y = mgr.make_posiliteral(VarId::new(2));
        let f = &x & &y;
        let dot = mgr.to_dot(&[&f]).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains("<x<SUB>1</SUB>>"));
        assert!(dot.contains("<x<SUB>2</SUB>>"));
        assert!(dot.contains("r0 -> n"));
    }

    #[test]
    fn test_to_dot_complement_edges() {
        let mgr = BddMgr::default();
        let x = mgr.make_posiliteral(VarId::new(0));
        let dot = mgr.to_dot(&[&x, &!&x]).unwrap();
        // Same node twice, once through a complemented root edge.
        assert_eq!(dot.matches("[label=<x<SUB>0</SUB>>]").count(), 1);
        assert!(dot.contains("r1 -> n0 [arrowhead=odot];"));
    }

    #[test]
    fn test_to_dot_constants_and_config() {
        let mgr = BddMgr::default();
        let config = DotConfig {
            use_html_labels: false,
            ..DotConfig::default()
        };
        let x = mgr.make_posiliteral(VarId::new(3));
        let one = mgr.make_one();
        let err = mgr.make_error();
        let dot = mgr.to_dot_with_config(&[&one, &x, &err], &config).unwrap();
        assert!(dot.contains("r0 -> t1;"));
        assert!(dot.contains("\"x3\""));
        assert!(dot.contains("r2 -> tE;"));
    }
}
