//! Expression nodes.

use std::rc::Rc;

use derive_more::Display;

use crate::error::InvalidLiteral;
use crate::node::{AstNode, Field, Node, NodeData};

/// Anything that produces a value.
#[derive(Clone, Debug)]
pub enum Expression {
    Literal(Rc<Literal>),
    Binary(Rc<BinaryOperation>),
    Call(Rc<FunctionCall>),
    Reference(Rc<Reference>),
}

impl Expression {
    pub fn node(&self) -> Node {
        match self {
            Expression::Literal(lit) => lit.clone().into(),
            Expression::Binary(bin) => bin.clone().into(),
            Expression::Call(call) => call.clone().into(),
            Expression::Reference(reference) => reference.clone().into(),
        }
    }

    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Literal(lit) => lit.data(),
            Expression::Binary(bin) => bin.data(),
            Expression::Call(call) => call.data(),
            Expression::Reference(reference) => reference.data(),
        }
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            _ => None,
        }
    }

    /// Evaluate with 64-bit wrapping semantics. Division by zero and
    /// `i64::MIN / -1` have no value.
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            BinaryOp::Add => Some(lhs.wrapping_add(rhs)),
            BinaryOp::Sub => Some(lhs.wrapping_sub(rhs)),
            BinaryOp::Mul => Some(lhs.wrapping_mul(rhs)),
            BinaryOp::Div => lhs.checked_div(rhs),
        }
    }
}

#[derive(Debug)]
pub struct BinaryOperation {
    pub(crate) data: NodeData,
    pub left: Expression,
    pub op: Rc<Operator>,
    pub right: Expression,
}

impl AstNode for BinaryOperation {
    const KIND: &'static str = "BinaryOperation";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("parent", Field::Ancestor),
            ("left", Field::Union(Some(self.left.node()))),
            ("op", Field::Child(self.op.clone().into())),
            ("right", Field::Union(Some(self.right.node()))),
        ]
    }
}

#[derive(Debug)]
pub struct Operator {
    pub(crate) data: NodeData,
    pub op: BinaryOp,
}

impl AstNode for Operator {
    const KIND: &'static str = "Operator";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![("parent", Field::Ancestor)]
    }
}

#[derive(Debug)]
pub struct FunctionCall {
    pub(crate) data: NodeData,
    pub callee: Rc<Reference>,
    pub args: Vec<Rc<Argument>>,
}

impl AstNode for FunctionCall {
    const KIND: &'static str = "FunctionCall";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("parent", Field::Ancestor),
            ("callee", Field::Child(self.callee.clone().into())),
            (
                "args",
                Field::Children(self.args.iter().cloned().map(Node::from).collect()),
            ),
        ]
    }
}

/// Payload of a positional argument.
#[derive(Clone, Debug)]
pub enum ArgumentValue {
    Literal(Rc<Literal>),
    Expression(Expression),
    Identifier(Rc<Reference>),
}

impl ArgumentValue {
    pub fn node(&self) -> Node {
        match self {
            ArgumentValue::Literal(lit) => lit.clone().into(),
            ArgumentValue::Expression(expr) => expr.node(),
            ArgumentValue::Identifier(reference) => reference.clone().into(),
        }
    }

    /// The payload viewed as a plain expression.
    pub fn to_expression(&self) -> Expression {
        match self {
            ArgumentValue::Literal(lit) => Expression::Literal(lit.clone()),
            ArgumentValue::Expression(expr) => expr.clone(),
            ArgumentValue::Identifier(reference) => Expression::Reference(reference.clone()),
        }
    }
}

#[derive(Debug)]
pub struct Argument {
    pub(crate) data: NodeData,
    pub value: ArgumentValue,
}

impl AstNode for Argument {
    const KIND: &'static str = "Argument";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("parent", Field::Ancestor),
            ("value", Field::Union(Some(self.value.node()))),
        ]
    }
}

/// An integer literal such as `42` or `1_000`.
#[derive(Debug)]
pub struct Literal {
    pub(crate) data: NodeData,
}

impl AstNode for Literal {
    const KIND: &'static str = "Literal";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![("parent", Field::Ancestor)]
    }
}

impl Literal {
    /// Parse the literal text. `_` separators are ignored; anything else that
    /// is not an ASCII digit makes the literal invalid.
    pub fn value(&self) -> Result<i64, InvalidLiteral> {
        let text = self.text();
        let digits: String = text.chars().filter(|&c| c != '_').collect();
        let invalid = || InvalidLiteral {
            text: text.to_string(),
            span: self.span(),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits.parse().map_err(|_| invalid())
    }
}

/// A name at a use site.
#[derive(Debug)]
pub struct Reference {
    pub(crate) data: NodeData,
}

impl AstNode for Reference {
    const KIND: &'static str = "Reference";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![("parent", Field::Ancestor)]
    }
}

impl Reference {
    pub fn name(&self) -> &str {
        self.text()
    }
}
