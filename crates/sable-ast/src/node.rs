//! The polymorphic node family and its field schema.
//!
//! Every node kind implements [`AstNode`], which reports the node's owned
//! fields classified by shape. The walker in [`crate::walk`] relies only on
//! that report, so adding a node kind never requires a new traversal.

use std::cell::OnceCell;
use std::fmt;
use std::rc::{Rc, Weak};

use sable_core::Span;
use sable_syntax::SyntaxNode;

use crate::decl::{FunctionDecl, Identifier, Module, Parameter, TypeRef};
use crate::error::StructuralError;
use crate::expr::{Argument, BinaryOperation, FunctionCall, Literal, Operator, Reference};
use crate::node_id::NodeId;
use crate::stmt::Statement;

/// State shared by every node: identity, source extent and parent link.
pub struct NodeData {
    id: NodeId,
    span: Span,
    source: Rc<str>,
    syntax: Option<Rc<SyntaxNode>>,
    parent: OnceCell<WeakNode>,
}

impl NodeData {
    pub(crate) fn new(
        id: NodeId,
        span: Span,
        source: Rc<str>,
        syntax: Option<Rc<SyntaxNode>>,
    ) -> Self {
        Self {
            id,
            span,
            source,
            syntax,
            parent: OnceCell::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The exact source slice this node covers. Empty for placeholders.
    pub fn text(&self) -> &str {
        self.source.get(self.span.range()).unwrap_or("")
    }

    pub fn source(&self) -> &Rc<str> {
        &self.source
    }

    /// The syntax fragment this node was built from.
    pub fn syntax(&self) -> Option<&Rc<SyntaxNode>> {
        self.syntax.as_ref()
    }

    /// Whether this node stands in for syntax the parser could not recover.
    pub fn is_placeholder(&self) -> bool {
        self.syntax.is_none()
    }

    /// The parent node. `None` for the root, and for every node before the
    /// adoption pass has run.
    pub fn parent(&self) -> Option<Node> {
        self.parent.get().and_then(WeakNode::upgrade)
    }

    pub(crate) fn set_parent(&self, parent: &Node) -> Result<(), StructuralError> {
        match self.parent.get() {
            None => {
                let _ = self.parent.set(parent.downgrade());
                Ok(())
            }
            Some(existing) => match existing.upgrade() {
                Some(existing) if existing.ptr_eq(parent) => Ok(()),
                _ => Err(StructuralError::SharedNode {
                    node: self.id,
                    span: self.span,
                }),
            },
        }
    }
}

impl fmt::Debug for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.span)
    }
}

/// How a node field relates to the node that owns it.
pub enum Field {
    /// Exactly one owned child.
    Child(Node),
    /// An owned child that may be absent.
    OptionalChild(Option<Node>),
    /// An ordered list of owned children of one kind.
    Children(Vec<Node>),
    /// A tagged-union slot; the payload is whichever node the tag selects.
    Union(Option<Node>),
    /// An ordered list of tagged-union slots.
    Unions(Vec<Node>),
    /// A link back up the tree. Never followed by the walker.
    Ancestor,
}

/// Behavior every node kind provides.
pub trait AstNode {
    const KIND: &'static str;

    fn data(&self) -> &NodeData;

    /// The node's fields, in source order, named and classified by shape.
    fn fields(&self) -> Vec<(&'static str, Field)>;

    fn id(&self) -> NodeId {
        self.data().id()
    }

    fn span(&self) -> Span {
        self.data().span()
    }

    fn text(&self) -> &str {
        self.data().text()
    }

    fn parent(&self) -> Option<Node> {
        self.data().parent()
    }
}

macro_rules! node_kinds {
    ($($kind:ident),* $(,)?) => {
        /// A strong handle to any node.
        #[derive(Clone)]
        pub enum Node {
            $($kind(Rc<$kind>),)*
        }

        /// A non-owning handle to any node, used for parent links.
        #[derive(Clone)]
        pub enum WeakNode {
            $($kind(Weak<$kind>),)*
        }

        impl Node {
            pub fn data(&self) -> &NodeData {
                match self {
                    $(Node::$kind(node) => node.data(),)*
                }
            }

            pub fn fields(&self) -> Vec<(&'static str, Field)> {
                match self {
                    $(Node::$kind(node) => node.fields(),)*
                }
            }

            pub fn kind(&self) -> &'static str {
                match self {
                    $(Node::$kind(_) => <$kind as AstNode>::KIND,)*
                }
            }

            pub fn downgrade(&self) -> WeakNode {
                match self {
                    $(Node::$kind(node) => WeakNode::$kind(Rc::downgrade(node)),)*
                }
            }
        }

        impl WeakNode {
            pub fn upgrade(&self) -> Option<Node> {
                match self {
                    $(WeakNode::$kind(node) => node.upgrade().map(Node::$kind),)*
                }
            }
        }

        $(
            impl From<Rc<$kind>> for Node {
                fn from(node: Rc<$kind>) -> Self {
                    Node::$kind(node)
                }
            }
        )*
    };
}

node_kinds!(
    Module,
    FunctionDecl,
    Parameter,
    TypeRef,
    Identifier,
    Statement,
    BinaryOperation,
    Operator,
    FunctionCall,
    Argument,
    Literal,
    Reference,
);

impl Node {
    pub fn id(&self) -> NodeId {
        self.data().id()
    }

    pub fn span(&self) -> Span {
        self.data().span()
    }

    pub fn text(&self) -> &str {
        self.data().text()
    }

    pub fn parent(&self) -> Option<Node> {
        self.data().parent()
    }

    pub fn is_placeholder(&self) -> bool {
        self.data().is_placeholder()
    }

    /// Identity comparison: true only for two handles to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        std::ptr::eq(self.data(), other.data())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {:?}", self.kind(), self.id(), self.text())
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(weak)")
    }
}
