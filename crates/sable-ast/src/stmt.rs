//! Statements and the statement-or-declaration slot.

use std::rc::Rc;

use derive_more::Display;

use crate::decl::Declaration;
use crate::expr::Expression;
use crate::node::{AstNode, Field, Node, NodeData};

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum StatementKeyword {
    #[display("out")]
    Out,
    #[display("return")]
    Return,
}

/// `out e;`, `return e;`, `return;`, or a bare expression statement.
#[derive(Debug)]
pub struct Statement {
    pub(crate) data: NodeData,
    pub keyword: Option<StatementKeyword>,
    pub expr: Option<Expression>,
}

impl AstNode for Statement {
    const KIND: &'static str = "Statement";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("parent", Field::Ancestor),
            ("expr", Field::Union(self.expr.as_ref().map(Expression::node))),
        ]
    }
}

/// One entry in a scope body.
#[derive(Clone, Debug)]
pub enum Slot {
    Statement(Rc<Statement>),
    Declaration(Declaration),
}

impl Slot {
    pub fn node(&self) -> Node {
        match self {
            Slot::Statement(stmt) => stmt.clone().into(),
            Slot::Declaration(decl) => decl.node(),
        }
    }
}
