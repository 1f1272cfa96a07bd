//! Errors raised while building or walking the AST.

use derive_more::{Display, Error};
use sable_core::Span;

use crate::node_id::NodeId;

/// Internal-consistency failures: the tree does not have the shape the code
/// walking it expects. These are never recovered from.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum StructuralError {
    #[display("node {node} at {span} already has a different parent")]
    SharedNode { node: NodeId, span: Span },
    #[display("{kind} node at {span} has no parent")]
    MissingParent { kind: &'static str, span: Span },
    #[display("node {node} is its own ancestor")]
    Cycle { node: NodeId },
    #[display("unexpected {found} syntax while building {expected}")]
    UnexpectedSyntax {
        expected: &'static str,
        found: String,
    },
}

/// A literal whose text is not a decimal integer that fits in 64 bits.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
#[display("invalid integer literal `{text}`")]
pub struct InvalidLiteral {
    pub text: String,
    pub span: Span,
}
