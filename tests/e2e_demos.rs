//! End-to-end runs of the programs under `demos/`

mod common;

use common::{compile, demo, run_jit};
use insta::assert_snapshot;
use sable::load_project;
use sable_cranelift::{ArtifactExecutable, BuildConfig, Executable};

#[test]
fn test_add_demo() {
    let (project, compilation) = load_project(demo("add.sb")).unwrap();
    assert_eq!(project.name, "add");
    assert_eq!(run_jit(&compilation), (0, vec!["5".to_string()]));
}

#[test]
fn test_squares_demo() {
    let (_, compilation) = load_project(demo("squares.sb")).unwrap();
    let (code, printed) = run_jit(&compilation);
    assert_eq!(printed, ["144", "50", "100"]);
    assert_eq!(code, 10);
}

#[test]
fn test_exit_code_wraps_to_i32() {
    let compilation = compile("return 4294967298;");
    assert_eq!(run_jit(&compilation).0, 2);
}

#[test]
fn test_add_demo_outline() {
    let (_, compilation) = load_project(demo("add.sb")).unwrap();
    assert_snapshot!(compilation.parsed.outline(), @r#"
    Module "add"
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
fn test_build_project_writes_artifact() {
    let (project, _) = load_project(demo("squares.sb")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("squares.clif");
    let mut artifact = ArtifactExecutable::new(BuildConfig::default(), &output);
    artifact.build_project(&project).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("; module squares\n"), "{text}");
    assert!(text.contains("; local twice(n)"), "{text}");
    let functions = text.lines().filter(|l| l.starts_with("function ")).count();
    assert_eq!(functions, 4);
}
