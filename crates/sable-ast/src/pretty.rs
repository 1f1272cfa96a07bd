//! Indented outline rendering of AST subtrees.

use std::fmt::Write as _;

use crate::node::{Field, Node};

/// Render `root` as an outline, one node per line, labelled with the field
/// it occupies in its parent.
pub fn outline(root: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, root, None, 0);
    out
}

fn write_node(out: &mut String, node: &Node, label: Option<&str>, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = match label {
        Some(label) => writeln!(out, "{indent}{label}: {}{}", node.kind(), summary(node)),
        None => writeln!(out, "{indent}{}{}", node.kind(), summary(node)),
    };
    for (name, field) in node.fields() {
        match field {
            Field::Child(child) => write_node(out, &child, Some(name), depth + 1),
            Field::OptionalChild(child) | Field::Union(child) => {
                if let Some(child) = child {
                    write_node(out, &child, Some(name), depth + 1);
                }
            }
            Field::Children(children) | Field::Unions(children) => {
                for (i, child) in children.iter().enumerate() {
                    write_node(out, child, Some(&format!("{name}[{i}]")), depth + 1);
                }
            }
            Field::Ancestor => {}
        }
    }
}

fn summary(node: &Node) -> String {
    if node.is_placeholder() {
        return " <missing>".to_string();
    }
    match node {
        Node::Module(module) => format!(" {:?}", module.name),
        Node::FunctionDecl(func) if func.is_pure => " pure".to_string(),
        Node::TypeRef(ty) if ty.is_unsigned => " unsigned".to_string(),
        Node::Statement(stmt) => stmt.keyword.map(|k| format!(" {k}")).unwrap_or_default(),
        Node::Identifier(_) | Node::Literal(_) | Node::Reference(_) | Node::Operator(_) => {
            format!(" {:?}", node.text())
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use crate::parse_module;

    #[test]
    fn test_outline_function_and_call() {
        let parsed = parse_module(
            "main",
            "fn add(a: int, b: int): int { return a + b; }\nout add(2, 3);",
        )
        .unwrap();
        assert_snapshot!(parsed.outline(), @r#"
        Module "main"
          body[0]: FunctionDecl
            name: Identifier "add"
            params[0]: Parameter
              name: Identifier "a"
              type: TypeRef
                name: Identifier "int"
            params[1]: Parameter
              name: Identifier "b"
              type: TypeRef
                name: Identifier "int"
            return_type: TypeRef
              name: Identifier "int"
            body[0]: Statement return
              expr: BinaryOperation
                left: Reference "a"
                op: Operator "+"
                right: Reference "b"
          body[1]: Statement out
            expr: FunctionCall
              callee: Reference "add"
              args[0]: Argument
                value: Literal "2"
              args[1]: Argument
                value: Literal "3"
        "#);
    }

    #[test]
    fn test_outline_marks_placeholders() {
        let parsed = parse_module("main", "pure fn (x: unsigned int) { out x * ; }").unwrap();
        assert_eq!(parsed.errors.len(), 2);
        assert_snapshot!(parsed.outline(), @r#"
        Module "main"
          body[0]: FunctionDecl pure
            name: Identifier <missing>
            params[0]: Parameter
              name: Identifier "x"
              type: TypeRef unsigned
                name: Identifier "int"
            body[0]: Statement out
              expr: BinaryOperation
                left: Reference "x"
                op: Operator "*"
                right: Reference <missing>
        "#);
    }
}
