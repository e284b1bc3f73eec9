//! Variable table: the bijection between registered variables and levels.

use std::collections::HashMap;
use std::mem::size_of;

use crate::types::{Level, VarId};

#[derive(Debug, Default)]
pub struct VarTable {
    level_to_var: Vec<VarId>,
    var_to_level: HashMap<VarId, Level>,
    max_vars: usize,
}

impl VarTable {
    pub fn new(max_vars: usize) -> Self {
        Self {
            level_to_var: Vec::new(),
            var_to_level: HashMap::new(),
            max_vars,
        }
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.level_to_var.len()
    }

    pub fn is_empty(&self) -> bool {
        self.level_to_var.is_empty()
    }

    /// Registers `var` at the bottom of the order.
    ///
    /// Returns `true` if the variable is (now) registered, `false` if the
    /// table is full.
    pub fn new_var(&mut self, var: VarId) -> bool {
        if self.var_to_level.contains_key(&var) {
            return true;
        }
        if self.level_to_var.len() >= self.max_vars {
            return false;
        }
        let level = Level::new(self.level_to_var.len() as u32);
        self.level_to_var.push(var);
        self.var_to_level.insert(var, level);
        true
    }

    pub fn level(&self, var: VarId) -> Option<Level> {
        self.var_to_level.get(&var).copied()
    }

    pub fn varid(&self, level: Level) -> Option<VarId> {
        self.level_to_var.get(level.index() as usize).copied()
    }

    /// Variables in level order.
    pub fn var_list(&self) -> &[VarId] {
        &self.level_to_var
    }

    /// Exchanges the variables at `level` and `level + 1`.
    pub fn swap(&mut self, level: Level) {
        let i = level.index() as usize;
        self.level_to_var.swap(i, i + 1);
        let (upper, lower) = (self.level_to_var[i], self.level_to_var[i + 1]);
        self.var_to_level.insert(upper, level);
        self.var_to_level.insert(lower, level.next());
    }

    pub fn used_mem(&self) -> usize {
        self.level_to_var.capacity() * size_of::<VarId>()
            + self.var_to_level.capacity() * (size_of::<VarId>() + size_of::<Level>())
    }
}
