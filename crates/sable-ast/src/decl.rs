//! Declarations and the module root.

use std::rc::Rc;

use crate::error::StructuralError;
use crate::node::{AstNode, Field, Node, NodeData};
use crate::stmt::Slot;

/// The root of a parsed source file. Its body is the top-level scope.
#[derive(Debug)]
pub struct Module {
    pub(crate) data: NodeData,
    pub name: String,
    pub body: Vec<Slot>,
}

impl AstNode for Module {
    const KIND: &'static str = "Module";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("parent", Field::Ancestor),
            ("body", Field::Unions(self.body.iter().map(Slot::node).collect())),
        ]
    }
}

impl Module {
    /// Function declarations directly in the top-level scope.
    pub fn functions(&self) -> impl Iterator<Item = &Rc<FunctionDecl>> {
        self.body.iter().filter_map(|slot| match slot {
            Slot::Declaration(Declaration::Function(func)) => Some(func),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub(crate) data: NodeData,
    pub is_pure: bool,
    pub name: Rc<Identifier>,
    pub params: Vec<Rc<Parameter>>,
    pub return_type: Option<Rc<TypeRef>>,
    pub body: Vec<Slot>,
}

impl AstNode for FunctionDecl {
    const KIND: &'static str = "FunctionDecl";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("parent", Field::Ancestor),
            ("name", Field::Child(self.name.clone().into())),
            (
                "params",
                Field::Children(self.params.iter().cloned().map(Node::from).collect()),
            ),
            (
                "return_type",
                Field::OptionalChild(self.return_type.clone().map(Node::from)),
            ),
            ("body", Field::Unions(self.body.iter().map(Slot::node).collect())),
        ]
    }
}

impl FunctionDecl {
    pub fn name(&self) -> &str {
        self.name.name()
    }

    /// Ordinal of `param` in this function's parameter list, by identity.
    pub fn param_position(&self, param: &Parameter) -> Option<usize> {
        self.params
            .iter()
            .position(|p| std::ptr::eq(p.as_ref(), param))
    }
}

#[derive(Debug)]
pub struct Parameter {
    pub(crate) data: NodeData,
    pub name: Rc<Identifier>,
    pub ty: Rc<TypeRef>,
}

impl AstNode for Parameter {
    const KIND: &'static str = "Parameter";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("parent", Field::Ancestor),
            ("name", Field::Child(self.name.clone().into())),
            ("type", Field::Child(self.ty.clone().into())),
        ]
    }
}

impl Parameter {
    pub fn name(&self) -> &str {
        self.name.name()
    }

    /// The function declaring this parameter. Requires the adoption pass.
    pub fn owner(&self) -> Result<Rc<FunctionDecl>, StructuralError> {
        match self.parent() {
            Some(Node::FunctionDecl(func)) => Ok(func),
            _ => Err(StructuralError::MissingParent {
                kind: Self::KIND,
                span: self.span(),
            }),
        }
    }
}

/// A type annotation such as `int` or `unsigned int`.
#[derive(Debug)]
pub struct TypeRef {
    pub(crate) data: NodeData,
    pub is_unsigned: bool,
    pub name: Rc<Identifier>,
}

impl AstNode for TypeRef {
    const KIND: &'static str = "TypeRef";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("parent", Field::Ancestor),
            ("name", Field::Child(self.name.clone().into())),
        ]
    }
}

/// A name at its declaration site.
#[derive(Debug)]
pub struct Identifier {
    pub(crate) data: NodeData,
}

impl AstNode for Identifier {
    const KIND: &'static str = "Identifier";

    fn data(&self) -> &NodeData {
        &self.data
    }

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![("parent", Field::Ancestor)]
    }
}

impl Identifier {
    pub fn name(&self) -> &str {
        self.text()
    }
}

/// Anything a name can resolve to.
#[derive(Clone, Debug)]
pub enum Declaration {
    Function(Rc<FunctionDecl>),
    Parameter(Rc<Parameter>),
}

impl Declaration {
    pub fn identifier(&self) -> &Rc<Identifier> {
        match self {
            Declaration::Function(func) => &func.name,
            Declaration::Parameter(param) => &param.name,
        }
    }

    pub fn name(&self) -> &str {
        self.identifier().name()
    }

    /// Whether the declared name denotes a compile-time constant value.
    ///
    /// Pure functions are constant: calls to them with constant arguments can
    /// be evaluated at compile time. Parameters never are.
    pub fn is_constant(&self) -> bool {
        match self {
            Declaration::Function(func) => func.is_pure,
            Declaration::Parameter(_) => false,
        }
    }

    pub fn node(&self) -> Node {
        match self {
            Declaration::Function(func) => func.clone().into(),
            Declaration::Parameter(param) => param.clone().into(),
        }
    }
}
