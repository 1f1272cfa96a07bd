//! Node-to-IR value cache.
//!
//! Keyed by [`NodeId`], so two structurally equal nodes never share an
//! entry. A node reached through a second path reuses the value emitted the
//! first time instead of emitting new instructions.

use std::collections::HashMap;

use cranelift_codegen::ir::Value;
use cranelift_module::FuncId;
use sable_ast::NodeId;

#[derive(Clone, Debug)]
pub enum Lowered {
    Value(Value),
    Function { id: FuncId, params: Vec<Value> },
}

#[derive(Debug, Default)]
pub struct ValueCache {
    entries: HashMap<NodeId, Lowered>,
    hits: usize,
}

impl ValueCache {
    pub fn value(&mut self, node: NodeId) -> Option<Value> {
        match self.entries.get(&node) {
            Some(Lowered::Value(value)) => {
                self.hits += 1;
                tracing::trace!(%node, "value cache hit");
                Some(*value)
            }
            _ => None,
        }
    }

    pub fn insert_value(&mut self, node: NodeId, value: Value) {
        self.entries.insert(node, Lowered::Value(value));
    }

    pub fn function(&self, node: NodeId) -> Option<(FuncId, &[Value])> {
        match self.entries.get(&node) {
            Some(Lowered::Function { id, params }) => Some((*id, params)),
            _ => None,
        }
    }

    pub fn insert_function(&mut self, node: NodeId, id: FuncId, params: Vec<Value>) {
        self.entries.insert(node, Lowered::Function { id, params });
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }
}
