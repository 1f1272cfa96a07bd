//! Shared helpers for sable-ast integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use sable_ast::{Expression, FunctionDecl, Module, ParsedModule, Slot, parse_module};

pub fn parse(source: &str) -> ParsedModule {
    let parsed = parse_module("test", source).expect("structural error");
    assert!(parsed.errors.is_empty(), "syntax errors: {:?}", parsed.errors);
    parsed
}

/// The expression of the `index`-th slot of `body`, which must be a statement.
pub fn statement_expr(body: &[Slot], index: usize) -> Expression {
    match &body[index] {
        Slot::Statement(stmt) => stmt.expr.clone().expect("statement has no expression"),
        Slot::Declaration(decl) => panic!("slot {index} is a declaration of {}", decl.name()),
    }
}

pub fn function(module: &Module, name: &str) -> Rc<FunctionDecl> {
    module
        .functions()
        .find(|f| f.name() == name)
        .cloned()
        .unwrap_or_else(|| panic!("no function `{name}`"))
}

pub fn function_in(parent: &FunctionDecl, name: &str) -> Rc<FunctionDecl> {
    parent
        .body
        .iter()
        .find_map(|slot| match slot {
            Slot::Declaration(sable_ast::Declaration::Function(f)) if f.name() == name => {
                Some(f.clone())
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no nested function `{name}`"))
}
