mod common;

use std::rc::Rc;

use sable_ast::{
    Declaration, Expression, ScopeRef, collect_references, fold, is_static_constant, resolve,
};

fn resolved_names(scope: &ScopeRef) -> Vec<Option<String>> {
    collect_references(scope)
        .unwrap()
        .iter()
        .map(|r| resolve(r).unwrap().map(|d| d.name().to_string()))
        .collect()
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let parsed = common::parse(
        "\
fn outer(n: int): int {
    fn inner(n: int): int { return n; }
    return n;
}
",
    );
    let outer = common::function(&parsed.module, "outer");
    let inner = common::function_in(&outer, "inner");

    let references = collect_references(&ScopeRef::Function(outer.clone())).unwrap();
    assert_eq!(references.len(), 2);

    match resolve(&references[0]).unwrap() {
        Some(Declaration::Parameter(param)) => assert!(Rc::ptr_eq(&param, &inner.params[0])),
        other => panic!("inner `n` resolved to {other:?}"),
    }
    match resolve(&references[1]).unwrap() {
        Some(Declaration::Parameter(param)) => assert!(Rc::ptr_eq(&param, &outer.params[0])),
        other => panic!("outer `n` resolved to {other:?}"),
    }
}

#[test]
fn test_parameter_shadows_module_function() {
    let parsed = common::parse(
        "\
fn x(): int { return 1; }
fn f(x: int): int { return x; }
out x();
",
    );
    let refs = collect_references(&parsed.scope()).unwrap();
    let names: Vec<_> = refs.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["x", "x"]);
    assert!(matches!(
        resolve(&refs[0]).unwrap(),
        Some(Declaration::Parameter(_))
    ));
    assert!(matches!(
        resolve(&refs[1]).unwrap(),
        Some(Declaration::Function(_))
    ));
}

#[test]
fn test_inner_names_are_invisible_outside() {
    let parsed = common::parse(
        "\
fn f(y: int): int {
    fn g(): int { return y; }
    return g();
}
out y;
out g();
",
    );
    assert_eq!(
        resolved_names(&parsed.scope()),
        vec![Some("y".to_string()), Some("g".to_string()), None, None]
    );
}

#[test]
fn test_declarations_order() {
    let parsed = common::parse(
        "\
fn outer(n: int): int {
    fn inner(m: int): int { return m; }
    return n;
}
",
    );
    let outer = common::function(&parsed.module, "outer");
    let inner = common::function_in(&outer, "inner");

    let names = |decls: Vec<Declaration>| {
        decls
            .iter()
            .map(|d| d.name().to_string())
            .collect::<Vec<_>>()
    };
    let outer_scope = ScopeRef::Function(outer);
    assert_eq!(names(outer_scope.declarations()), vec!["inner", "n"]);
    let inner_scope = ScopeRef::Function(inner);
    assert_eq!(
        names(inner_scope.all_in_scope_declarations().unwrap()),
        vec!["m", "inner", "n", "outer"]
    );
    assert!(parsed.scope().enclosing().unwrap().is_none());
}

#[test]
fn test_placeholder_reference_is_unresolved() {
    let parsed = sable_ast::parse_module("test", "fn (a: int): int { return a; }\nout 1 + ;").unwrap();
    assert_eq!(parsed.errors.len(), 2);
    let refs = collect_references(&parsed.scope()).unwrap();
    let placeholder = refs.last().unwrap();
    assert!(sable_ast::AstNode::data(placeholder.as_ref()).is_placeholder());
    assert!(resolve(placeholder).unwrap().is_none());
}

const CONSTANTS: &str = "\
pure fn sq(v: int): int { return v * v; }
fn noisy(v: int): int { out v; return v; }
fn f(x: int): int { return 1 + x; }
1;
1 + 2;
sq(2);
noisy(2);
sq((1 + 2) * 3);
sq(f(1));
(1 + 2) * 3;
8 / 0;
";

fn top_level(index: usize) -> (sable_ast::ParsedModule, Expression) {
    let parsed = common::parse(CONSTANTS);
    let expr = common::statement_expr(&parsed.module.body, index);
    (parsed, expr)
}

#[test]
fn test_literal_and_arithmetic_are_constant() {
    let (_parsed, literal) = top_level(3);
    assert!(is_static_constant(&literal).unwrap());
    let (_parsed, sum) = top_level(4);
    assert!(is_static_constant(&sum).unwrap());
}

#[test]
fn test_parameter_reference_is_not_constant() {
    let parsed = common::parse(CONSTANTS);
    let f = common::function(&parsed.module, "f");
    let expr = common::statement_expr(&f.body, 0);
    assert!(matches!(expr, Expression::Binary(_)));
    assert!(!is_static_constant(&expr).unwrap());
}

#[test]
fn test_call_constancy_depends_on_purity_and_arguments() {
    let (_parsed, pure_call) = top_level(5);
    assert!(is_static_constant(&pure_call).unwrap());
    let (_parsed, impure_call) = top_level(6);
    assert!(!is_static_constant(&impure_call).unwrap());
    let (_parsed, nested) = top_level(7);
    assert!(is_static_constant(&nested).unwrap());
    let (_parsed, impure_argument) = top_level(8);
    assert!(!is_static_constant(&impure_argument).unwrap());
}

#[test]
fn test_fold_recurses_through_operations() {
    let (_parsed, expr) = top_level(9);
    assert_eq!(fold(&expr), Some(9));
    let (_parsed, expr) = top_level(4);
    assert_eq!(fold(&expr), Some(3));
}

#[test]
fn test_fold_leaves_calls_and_division_by_zero() {
    let (_parsed, call) = top_level(5);
    assert_eq!(fold(&call), None);
    let (_parsed, div) = top_level(10);
    assert!(is_static_constant(&div).unwrap());
    assert_eq!(fold(&div), None);
}
