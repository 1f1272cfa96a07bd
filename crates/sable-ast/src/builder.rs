//! Concrete syntax tree to AST conversion.
//!
//! The builder never fails on incomplete syntax: a mandatory child the
//! parser could not produce becomes a placeholder node with empty text and a
//! zero-width span at the last source offset the builder reached.

use std::rc::Rc;

use sable_core::{LineIndex, Span};
use sable_syntax::{SyntaxKind, SyntaxNode};

use crate::decl::{Declaration, FunctionDecl, Identifier, Module, Parameter, TypeRef};
use crate::error::StructuralError;
use crate::expr::{
    Argument, ArgumentValue, BinaryOp, BinaryOperation, Expression, FunctionCall, Literal,
    Operator, Reference,
};
use crate::node::NodeData;
use crate::node_id::NodeId;
use crate::stmt::{Slot, Statement, StatementKeyword};

pub struct AstBuilder {
    source: Rc<str>,
    index: LineIndex,
    next_id: u32,
    last_offset: usize,
}

impl AstBuilder {
    pub fn new(source: impl Into<Rc<str>>) -> Self {
        let source = source.into();
        Self {
            index: LineIndex::new(source.clone()),
            source,
            next_id: 0,
            last_offset: 0,
        }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn data(&mut self, syntax: &Rc<SyntaxNode>) -> NodeData {
        self.last_offset = if syntax.children.is_empty() {
            syntax.range.end
        } else {
            syntax.range.start
        };
        let span = Span::from_range(&self.index, syntax.range.clone());
        NodeData::new(self.next_id(), span, self.source.clone(), Some(syntax.clone()))
    }

    fn placeholder(&mut self) -> NodeData {
        let span = Span::empty_at(&self.index, self.last_offset);
        NodeData::new(self.next_id(), span, self.source.clone(), None)
    }

    fn text(&self, syntax: &SyntaxNode) -> &str {
        syntax.text(&self.source)
    }

    fn unexpected(expected: &'static str, syntax: &SyntaxNode) -> StructuralError {
        StructuralError::UnexpectedSyntax {
            expected,
            found: syntax.kind.to_string(),
        }
    }

    pub fn module(
        &mut self,
        name: impl Into<String>,
        root: &Rc<SyntaxNode>,
    ) -> Result<Rc<Module>, StructuralError> {
        if root.kind != SyntaxKind::Module {
            return Err(Self::unexpected("Module", root));
        }
        let data = self.data(root);
        let body = self.slots(&root.children)?;
        Ok(Rc::new(Module {
            data,
            name: name.into(),
            body,
        }))
    }

    fn slots(&mut self, items: &[Rc<SyntaxNode>]) -> Result<Vec<Slot>, StructuralError> {
        let mut slots = Vec::with_capacity(items.len());
        for item in items {
            match item.kind {
                SyntaxKind::FunctionDecl => slots.push(Slot::Declaration(
                    Declaration::Function(self.function(item)?),
                )),
                SyntaxKind::Statement => slots.push(Slot::Statement(self.statement(item)?)),
                SyntaxKind::Error => {}
                _ => return Err(Self::unexpected("Slot", item)),
            }
        }
        Ok(slots)
    }

    fn function(&mut self, syntax: &Rc<SyntaxNode>) -> Result<Rc<FunctionDecl>, StructuralError> {
        let data = self.data(syntax);
        let is_pure = syntax.has_keyword(&self.source, "pure");
        let name = self.identifier(syntax.child(SyntaxKind::Name));
        let params = match syntax.child(SyntaxKind::ParamList) {
            Some(list) => list
                .children_of(SyntaxKind::Param)
                .map(|param| self.parameter(param))
                .collect(),
            None => Vec::new(),
        };
        let return_type = syntax
            .child(SyntaxKind::TypeRef)
            .map(|ty| self.type_ref(Some(ty)));
        let body = match syntax.child(SyntaxKind::Block) {
            Some(block) => self.slots(&block.children)?,
            None => Vec::new(),
        };
        Ok(Rc::new(FunctionDecl {
            data,
            is_pure,
            name,
            params,
            return_type,
            body,
        }))
    }

    fn parameter(&mut self, syntax: &Rc<SyntaxNode>) -> Rc<Parameter> {
        let data = self.data(syntax);
        let name = self.identifier(syntax.child(SyntaxKind::Name));
        let ty = self.type_ref(syntax.child(SyntaxKind::TypeRef));
        Rc::new(Parameter { data, name, ty })
    }

    fn type_ref(&mut self, syntax: Option<&Rc<SyntaxNode>>) -> Rc<TypeRef> {
        match syntax {
            Some(syntax) => {
                let data = self.data(syntax);
                let is_unsigned = syntax.has_keyword(&self.source, "unsigned");
                let name = self.identifier(syntax.child(SyntaxKind::Name));
                Rc::new(TypeRef {
                    data,
                    is_unsigned,
                    name,
                })
            }
            None => {
                let data = self.placeholder();
                let name = self.identifier(None);
                Rc::new(TypeRef {
                    data,
                    is_unsigned: false,
                    name,
                })
            }
        }
    }

    fn identifier(&mut self, syntax: Option<&Rc<SyntaxNode>>) -> Rc<Identifier> {
        let data = match syntax {
            Some(syntax) => self.data(syntax),
            None => self.placeholder(),
        };
        Rc::new(Identifier { data })
    }

    fn statement(&mut self, syntax: &Rc<SyntaxNode>) -> Result<Rc<Statement>, StructuralError> {
        let data = self.data(syntax);
        let keyword = syntax
            .child(SyntaxKind::Keyword)
            .and_then(|kw| match self.text(kw) {
                "out" => Some(StatementKeyword::Out),
                "return" => Some(StatementKeyword::Return),
                _ => None,
            });
        let expr = match syntax.children.iter().find(|c| c.kind.is_expression()) {
            Some(expr) => Some(self.expression(Some(expr))?),
            None => None,
        };
        Ok(Rc::new(Statement {
            data,
            keyword,
            expr,
        }))
    }

    fn expression(
        &mut self,
        syntax: Option<&Rc<SyntaxNode>>,
    ) -> Result<Expression, StructuralError> {
        let Some(syntax) = syntax else {
            let data = self.placeholder();
            return Ok(Expression::Reference(Rc::new(Reference { data })));
        };
        Ok(match syntax.kind {
            SyntaxKind::Literal => Expression::Literal(self.literal(syntax)),
            SyntaxKind::Name => Expression::Reference(self.reference(Some(syntax))),
            SyntaxKind::BinaryExpr => Expression::Binary(self.binary(syntax)?),
            SyntaxKind::CallExpr => Expression::Call(self.call(syntax)?),
            _ => return Err(Self::unexpected("Expression", syntax)),
        })
    }

    fn binary(&mut self, syntax: &Rc<SyntaxNode>) -> Result<Rc<BinaryOperation>, StructuralError> {
        let data = self.data(syntax);
        let left = self.expression(syntax.children.first())?;
        let op_syntax = syntax
            .child(SyntaxKind::Operator)
            .ok_or_else(|| Self::unexpected("Operator", syntax))?;
        let op = BinaryOp::from_symbol(self.text(op_syntax))
            .ok_or_else(|| Self::unexpected("Operator", op_syntax))?;
        let op = Rc::new(Operator {
            data: self.data(op_syntax),
            op,
        });
        let right = self.expression(syntax.children.get(2))?;
        Ok(Rc::new(BinaryOperation {
            data,
            left,
            op,
            right,
        }))
    }

    fn call(&mut self, syntax: &Rc<SyntaxNode>) -> Result<Rc<FunctionCall>, StructuralError> {
        let data = self.data(syntax);
        let callee = self.reference(syntax.child(SyntaxKind::Name));
        let mut args = Vec::new();
        if let Some(list) = syntax.child(SyntaxKind::ArgList) {
            for arg in list.children_of(SyntaxKind::Argument) {
                args.push(self.argument(arg)?);
            }
        }
        Ok(Rc::new(FunctionCall { data, callee, args }))
    }

    fn argument(&mut self, syntax: &Rc<SyntaxNode>) -> Result<Rc<Argument>, StructuralError> {
        let data = self.data(syntax);
        let value = match syntax.children.first() {
            Some(inner) if inner.kind == SyntaxKind::Literal => {
                ArgumentValue::Literal(self.literal(inner))
            }
            Some(inner) if inner.kind == SyntaxKind::Name => {
                ArgumentValue::Identifier(self.reference(Some(inner)))
            }
            inner => ArgumentValue::Expression(self.expression(inner)?),
        };
        Ok(Rc::new(Argument { data, value }))
    }

    fn literal(&mut self, syntax: &Rc<SyntaxNode>) -> Rc<Literal> {
        Rc::new(Literal {
            data: self.data(syntax),
        })
    }

    fn reference(&mut self, syntax: Option<&Rc<SyntaxNode>>) -> Rc<Reference> {
        let data = match syntax {
            Some(syntax) => self.data(syntax),
            None => self.placeholder(),
        };
        Rc::new(Reference { data })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::ops::ControlFlow;

    use sable_core::Position;

    use super::*;
    use crate::node::{AstNode, Node};
    use crate::walk::{WalkAction, walk};

    fn build(source: &str) -> Rc<Module> {
        let parse = sable_syntax::parse(source);
        AstBuilder::new(source).module("test", &parse.root).unwrap()
    }

    #[test]
    fn test_node_ids_are_unique() {
        let module = build("fn f(a: int): int { return a * 2; }\nout f(1 + 2);");
        let mut ids = HashSet::new();
        let mut count = 0;
        let _flow = walk(&Node::from(module), |node, _| {
            ids.insert(node.id());
            count += 1;
            ControlFlow::<(), WalkAction>::Continue(WalkAction::Advance)
        })
        .unwrap();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_missing_operand_is_placeholder_after_operator() {
        let module = build("out 1 + ;");
        let Slot::Statement(stmt) = &module.body[0] else {
            panic!("expected statement");
        };
        let Some(Expression::Binary(bin)) = &stmt.expr else {
            panic!("expected binary operation");
        };
        let right = bin.right.data();
        assert!(right.is_placeholder());
        assert_eq!(right.text(), "");
        assert_eq!(right.span().offset, 7);
        assert_eq!(right.span().start, Position::new(1, 8));
        assert!(right.span().is_empty());
    }

    #[test]
    fn test_missing_parameter_type_is_placeholder() {
        let module = build("fn f(a) { }");
        let func = module.functions().next().unwrap();
        let param = &func.params[0];
        assert_eq!(param.name(), "a");
        assert!(param.ty.data().is_placeholder());
        assert!(param.ty.name.data().is_placeholder());
    }

    #[test]
    fn test_error_items_are_dropped() {
        let module = build("} out 1;");
        assert_eq!(module.body.len(), 1);
    }

    #[test]
    fn test_syntax_link_is_kept() {
        let module = build("out 42;");
        let Slot::Statement(stmt) = &module.body[0] else {
            panic!("expected statement");
        };
        let syntax = stmt.data().syntax().unwrap();
        assert_eq!(syntax.kind, SyntaxKind::Statement);
        assert_eq!(stmt.text(), "out 42;");
    }

    #[test]
    fn test_rejects_non_module_root() {
        let leaf = SyntaxNode::leaf(SyntaxKind::Literal, 0..1);
        let err = AstBuilder::new("1").module("test", &leaf).unwrap_err();
        assert_eq!(
            err,
            StructuralError::UnexpectedSyntax {
                expected: "Module",
                found: "Literal".to_string(),
            }
        );
    }
}
