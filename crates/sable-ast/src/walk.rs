//! Generic tree traversal.
//!
//! One walker serves every node kind: it asks each node for its field
//! schema ([`AstNode::fields`](crate::node::AstNode::fields)) and descends
//! into owned fields only. Ancestor fields are skipped, so parent links can
//! never send the walk back up the tree.
//!
//! ```ignore
//! use std::ops::ControlFlow;
//! use sable_ast::walk::{walk, WalkAction};
//!
//! // Count literals, but do not look inside nested functions
//! let mut literals = 0;
//! let _flow = walk(&root, |node, _parent| {
//!     match node {
//!         Node::Literal(_) => literals += 1,
//!         Node::FunctionDecl(_) => return ControlFlow::Continue(WalkAction::Skip),
//!         _ => {}
//!     }
//!     ControlFlow::<(), WalkAction>::Continue(WalkAction::Advance)
//! })?;
//! ```

use std::ops::ControlFlow;
use std::rc::Rc;

use sable_core::Position;

use crate::error::StructuralError;
use crate::expr::Reference;
use crate::node::{Field, Node};
use crate::node_id::NodeId;
use crate::resolve::ScopeRef;

/// Controls whether to descend into children during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
    /// Continue walking and descend into the node's children.
    Advance,
    /// Skip the children of the current node.
    Skip,
}

/// Walk `root` and its descendants in pre-order, source order.
///
/// `f` receives each node together with the node whose field it was reached
/// through (`None` for `root`). Returns `Break(b)` as soon as `f` does.
pub fn walk<B>(
    root: &Node,
    mut f: impl FnMut(&Node, Option<&Node>) -> ControlFlow<B, WalkAction>,
) -> Result<ControlFlow<B>, StructuralError> {
    let mut path = Vec::new();
    walk_internal(root, None, &mut path, &mut f)
}

// Internal helper to avoid recursion limit issues with impl FnMut
fn walk_internal<B>(
    node: &Node,
    parent: Option<&Node>,
    path: &mut Vec<NodeId>,
    f: &mut dyn FnMut(&Node, Option<&Node>) -> ControlFlow<B, WalkAction>,
) -> Result<ControlFlow<B>, StructuralError> {
    if path.contains(&node.id()) {
        return Err(StructuralError::Cycle { node: node.id() });
    }
    match f(node, parent) {
        ControlFlow::Break(b) => return Ok(ControlFlow::Break(b)),
        ControlFlow::Continue(WalkAction::Skip) => return Ok(ControlFlow::Continue(())),
        ControlFlow::Continue(WalkAction::Advance) => {}
    }

    path.push(node.id());
    for (_, field) in node.fields() {
        let children = match field {
            Field::Child(child) => vec![child],
            Field::OptionalChild(child) | Field::Union(child) => child.into_iter().collect(),
            Field::Children(children) | Field::Unions(children) => children,
            Field::Ancestor => continue,
        };
        for child in &children {
            if let ControlFlow::Break(b) = walk_internal(child, Some(node), path, f)? {
                return Ok(ControlFlow::Break(b));
            }
        }
    }
    path.pop();
    Ok(ControlFlow::Continue(()))
}

/// Link every node to its parent. Returns the number of nodes visited.
///
/// Running the pass again over the same tree is a no-op. A node reachable
/// from two different parents is a [`StructuralError::SharedNode`].
pub fn adopt(root: &Node) -> Result<usize, StructuralError> {
    let mut visited = 0;
    let flow = walk(root, |node, parent| {
        visited += 1;
        if let Some(parent) = parent
            && let Err(err) = node.data().set_parent(parent)
        {
            return ControlFlow::Break(err);
        }
        ControlFlow::Continue(WalkAction::Advance)
    })?;
    if let ControlFlow::Break(err) = flow {
        return Err(err);
    }
    tracing::trace!(nodes = visited, "adopted");
    Ok(visited)
}

/// The most specific node whose span contains `position`.
///
/// Among nodes with equally short spans the first one found in pre-order
/// wins. Zero-width placeholders never match.
pub fn node_at(root: &Node, position: Position) -> Result<Option<Node>, StructuralError> {
    let mut best: Option<Node> = None;
    let _flow = walk(root, |node, _| {
        let span = node.span();
        if span.contains(position) && best.as_ref().is_none_or(|b| span.len < b.span().len) {
            best = Some(node.clone());
        }
        ControlFlow::<(), WalkAction>::Continue(WalkAction::Advance)
    })?;
    Ok(best)
}

/// Every reference reachable downward from `scope`, in source order.
pub fn collect_references(scope: &ScopeRef) -> Result<Vec<Rc<Reference>>, StructuralError> {
    let mut references = Vec::new();
    let _flow = walk(&scope.node(), |node, _| {
        if let Node::Reference(reference) = node {
            references.push(reference.clone());
        }
        ControlFlow::<(), WalkAction>::Continue(WalkAction::Advance)
    })?;
    Ok(references)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use sable_core::{LineIndex, Span};

    use super::*;
    use crate::decl::Module;
    use crate::node::NodeData;
    use crate::parse_module;

    #[test]
    fn test_reparenting_is_structural_error() {
        let first = parse_module("first", "out 1;").unwrap();
        let shared = first.module.body[0].clone();

        let index = LineIndex::new("");
        let second = Rc::new(Module {
            data: NodeData::new(NodeId::new(100), Span::empty_at(&index, 0), "".into(), None),
            name: "second".to_string(),
            body: vec![shared],
        });
        let err = adopt(&Node::from(second)).unwrap_err();
        assert!(matches!(err, StructuralError::SharedNode { .. }));
    }

    #[test]
    fn test_adopt_counts_nodes() {
        let parsed = parse_module("main", "out 1 + 2;").unwrap();
        // Module, Statement, BinaryOperation, two literals and the operator
        assert_eq!(adopt(&parsed.root()).unwrap(), 6);
    }
}
