//! Abstract syntax tree for Sable.
//!
//! Nodes are built from the concrete syntax tree by [`AstBuilder`], then
//! linked to their parents once by [`walk::adopt`]. After that the tree is
//! read-only: name resolution ([`resolve`]) and constant analysis
//! ([`constant`]) only query it.

use std::rc::Rc;

pub mod builder;
pub mod constant;
pub mod decl;
pub mod error;
pub mod expr;
pub mod node;
pub mod node_id;
pub mod pretty;
pub mod project;
pub mod resolve;
pub mod stmt;
pub mod walk;

pub use builder::AstBuilder;
pub use constant::{fold, is_static_constant};
pub use decl::{Declaration, FunctionDecl, Identifier, Module, Parameter, TypeRef};
pub use error::{InvalidLiteral, StructuralError};
pub use expr::{
    Argument, ArgumentValue, BinaryOp, BinaryOperation, Expression, FunctionCall, Literal,
    Operator, Reference,
};
pub use node::{AstNode, Field, Node, NodeData, WeakNode};
pub use node_id::NodeId;
pub use project::Project;
pub use resolve::{ScopeRef, declaring_scope, enclosing_scope, resolve};
pub use stmt::{Slot, Statement, StatementKeyword};
pub use walk::{WalkAction, adopt, collect_references, node_at, walk};

use sable_syntax::ParseError;

/// A module built and adopted from source text, with any syntax errors the
/// parser recovered from.
#[derive(Debug)]
pub struct ParsedModule {
    pub module: Rc<Module>,
    pub errors: Vec<ParseError>,
}

impl ParsedModule {
    pub fn root(&self) -> Node {
        self.module.clone().into()
    }

    pub fn scope(&self) -> ScopeRef {
        ScopeRef::Module(self.module.clone())
    }

    pub fn outline(&self) -> String {
        pretty::outline(&self.root())
    }
}

/// Parse `source`, build its AST and run the adoption pass.
pub fn parse_module(
    name: &str,
    source: impl Into<Rc<str>>,
) -> Result<ParsedModule, StructuralError> {
    let source = source.into();
    let parse = sable_syntax::parse(&source);
    let module = AstBuilder::new(source).module(name, &parse.root)?;
    let root: Node = module.clone().into();
    adopt(&root)?;
    tracing::debug!(module = name, errors = parse.errors.len(), "parsed");
    Ok(ParsedModule {
        module,
        errors: parse.errors,
    })
}
