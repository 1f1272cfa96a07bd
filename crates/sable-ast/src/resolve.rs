//! Scope and declaration resolution.
//!
//! Resolution follows parent links, so every query here requires the
//! adoption pass to have run over the tree.

use std::rc::Rc;

use crate::decl::{Declaration, FunctionDecl, Module};
use crate::error::StructuralError;
use crate::expr::Reference;
use crate::node::{AstNode, Node, NodeData};
use crate::stmt::Slot;

/// A node that owns declarations: the module top level or a function body.
#[derive(Clone, Debug)]
pub enum ScopeRef {
    Module(Rc<Module>),
    Function(Rc<FunctionDecl>),
}

impl ScopeRef {
    pub fn node(&self) -> Node {
        match self {
            ScopeRef::Module(module) => module.clone().into(),
            ScopeRef::Function(func) => func.clone().into(),
        }
    }

    fn slots(&self) -> &[Slot] {
        match self {
            ScopeRef::Module(module) => &module.body,
            ScopeRef::Function(func) => &func.body,
        }
    }

    /// Declarations this scope introduces itself: its declaration slots in
    /// order, then (for functions) its parameters.
    pub fn declarations(&self) -> Vec<Declaration> {
        let mut decls: Vec<Declaration> = self
            .slots()
            .iter()
            .filter_map(|slot| match slot {
                Slot::Declaration(decl) => Some(decl.clone()),
                Slot::Statement(_) => None,
            })
            .collect();
        if let ScopeRef::Function(func) = self {
            decls.extend(func.params.iter().cloned().map(Declaration::Parameter));
        }
        decls
    }

    /// Every declaration visible from this scope, innermost first.
    ///
    /// Taking the first match by name therefore honors shadowing.
    pub fn all_in_scope_declarations(&self) -> Result<Vec<Declaration>, StructuralError> {
        let mut decls = self.declarations();
        let mut scope = self.enclosing()?;
        while let Some(outer) = scope {
            decls.extend(outer.declarations());
            scope = outer.enclosing()?;
        }
        Ok(decls)
    }

    /// The nearest scope enclosing this one. `None` for the module.
    pub fn enclosing(&self) -> Result<Option<ScopeRef>, StructuralError> {
        match self {
            ScopeRef::Module(_) => Ok(None),
            ScopeRef::Function(func) => scope_above(func.data(), FunctionDecl::KIND).map(Some),
        }
    }
}

/// The nearest scope strictly above `node`.
pub fn enclosing_scope(node: &Node) -> Result<ScopeRef, StructuralError> {
    scope_above(node.data(), node.kind())
}

/// The scope a function declaration belongs to.
pub fn declaring_scope(func: &FunctionDecl) -> Result<ScopeRef, StructuralError> {
    scope_above(func.data(), FunctionDecl::KIND)
}

fn scope_above(data: &NodeData, kind: &'static str) -> Result<ScopeRef, StructuralError> {
    let mut current = data.parent().ok_or(StructuralError::MissingParent {
        kind,
        span: data.span(),
    })?;
    loop {
        match current {
            Node::Module(module) => return Ok(ScopeRef::Module(module)),
            Node::FunctionDecl(func) => return Ok(ScopeRef::Function(func)),
            node => {
                current = node.parent().ok_or(StructuralError::MissingParent {
                    kind: node.kind(),
                    span: node.span(),
                })?;
            }
        }
    }
}

/// The declaration `reference` names, or `None` when no visible
/// declaration has that name. Placeholder references never resolve.
pub fn resolve(reference: &Reference) -> Result<Option<Declaration>, StructuralError> {
    if reference.data().is_placeholder() {
        return Ok(None);
    }
    let scope = scope_above(reference.data(), Reference::KIND)?;
    let decls = scope.all_in_scope_declarations()?;
    let name = reference.name();
    let found = decls.into_iter().find(|decl| decl.name() == name);
    tracing::trace!(name, resolved = found.is_some(), "resolve");
    Ok(found)
}
