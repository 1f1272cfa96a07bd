//! Build/run lifecycle of both executable kinds

mod common;

use std::fs;

use common::{ADD_PROGRAM, parse, record_events};
use sable_cranelift::{
    ArtifactExecutable, BuildConfig, CompilationErrorKind, Executable, JitExecutable,
};
use sable_runtime::capture_output;
use target_lexicon::Triple;

#[test]
fn test_jit_runs_add_program() {
    let parsed = parse(ADD_PROGRAM);
    let mut jit = JitExecutable::default();
    let entry = jit.build(&parsed.module).unwrap();
    assert_eq!(entry.symbol, "main");

    let (code, printed) = capture_output(|| jit.run());
    assert_eq!(code.unwrap(), 0);
    assert_eq!(printed, ["5"]);
}

#[test]
fn test_top_level_return_sets_exit_code() {
    let parsed = parse("fn add(a: int, b: int): int { return a + b; }\nreturn add(2, 3);");
    let mut jit = JitExecutable::default();
    jit.build(&parsed.module).unwrap();
    assert_eq!(jit.run().unwrap(), 5);
}

#[test]
fn test_jit_program_output_in_order() {
    let parsed = parse(
        "pure fn sq(x: int): int { return x * x; }\n\
         fn dist(a: int, b: int): int { return sq(a) + sq(b); }\n\
         out sq(7);\nout dist(3, 4);\nout 100 / 7 - 2;",
    );
    let mut jit = JitExecutable::default();
    jit.build(&parsed.module).unwrap();
    let (code, printed) = capture_output(|| jit.run());
    assert_eq!(code.unwrap(), 0);
    assert_eq!(printed, ["49", "25", "12"]);
}

#[test]
fn test_jit_calls_the_innermost_visible_function() {
    let parsed = parse(
        "fn g(): int { return 1; }\n\
         fn f(): int { fn g(): int { return 2; } return g(); }\n\
         out f();\nout g();",
    );
    let mut jit = JitExecutable::default();
    jit.build(&parsed.module).unwrap();
    let (code, printed) = capture_output(|| jit.run());
    assert_eq!(code.unwrap(), 0);
    assert_eq!(printed, ["2", "1"]);
}

#[test]
fn test_run_before_build_is_a_precondition_violation() {
    let mut jit = JitExecutable::default();
    let error = jit.run().unwrap_err();
    assert!(matches!(error.kind(), CompilationErrorKind::Precondition(_)));
    assert_eq!(
        error.to_string(),
        "Precondition violated: run requires a successful build"
    );
}

#[test]
fn test_failed_build_leaves_nothing_to_run() {
    let mut jit = JitExecutable::default();
    jit.build(&parse(ADD_PROGRAM).module).unwrap();
    assert!(jit.is_built());

    let broken = parse("out missing(1);");
    assert!(jit.build(&broken.module).is_err());
    assert!(!jit.is_built());
    assert!(matches!(
        jit.run().unwrap_err().kind(),
        CompilationErrorKind::Precondition(_)
    ));
}

#[test]
fn test_rebuild_replaces_previous_program() {
    let mut jit = JitExecutable::default();
    jit.build(&parse("return 1;").module).unwrap();
    assert_eq!(jit.run().unwrap(), 1);
    jit.build(&parse("return 2;").module).unwrap();
    assert_eq!(jit.run().unwrap(), 2);
}

#[test]
fn test_jit_rejects_foreign_target() {
    let foreign: Triple = "riscv32-unknown-none-elf".parse().unwrap();
    let mut jit = JitExecutable::new(BuildConfig {
        target: Some(foreign),
        ..BuildConfig::default()
    });
    let error = jit.initialize().unwrap_err();
    assert!(matches!(error.kind(), CompilationErrorKind::InvalidTarget(_)));
}

#[test]
fn test_events_are_reported_in_order() {
    let parsed = parse(ADD_PROGRAM);
    let mut jit = JitExecutable::default();
    let seen = record_events(&mut jit);
    jit.build(&parsed.module).unwrap();
    capture_output(|| jit.run()).0.unwrap();

    assert_eq!(
        *seen.borrow(),
        [
            "build: build started",
            "build: lowering",
            "build: lowered",
            "build: build finished",
            "run: running",
            "run: finished",
        ]
    );
}

#[test]
fn test_artifact_contains_both_functions() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("add.clif");
    let mut artifact = ArtifactExecutable::new(BuildConfig::default(), &output);
    let entry = artifact.build(&parse(ADD_PROGRAM).module).unwrap();
    assert_eq!(entry.symbol, "main");
    assert_eq!(artifact.artifact_path(), Some(output.as_path()));
    assert_eq!(artifact.object_path(), None);

    let text = fs::read_to_string(&output).unwrap();
    let functions: Vec<_> = text
        .lines()
        .filter(|line| line.starts_with("function "))
        .collect();
    assert_eq!(functions.len(), 2, "{text}");
    assert!(functions[0].starts_with("function %add(i64, i64) -> i64"));
    assert!(functions[1].starts_with("function %main() -> i64"));
}

#[test]
fn test_artifact_run_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let mut artifact = ArtifactExecutable::new(BuildConfig::default(), dir.path().join("a.clif"));
    assert!(matches!(
        artifact.run().unwrap_err().kind(),
        CompilationErrorKind::Unsupported(_)
    ));

    artifact.build(&parse(ADD_PROGRAM).module).unwrap();
    assert!(matches!(
        artifact.run().unwrap_err().kind(),
        CompilationErrorKind::Unsupported(_)
    ));
}

#[test]
fn test_artifact_can_emit_object() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("add.clif");
    let config = BuildConfig {
        emit_object: true,
        ..BuildConfig::default()
    };
    let mut artifact = ArtifactExecutable::new(config, &output);
    artifact.build(&parse(ADD_PROGRAM).module).unwrap();

    let object = dir.path().join("add.o");
    assert_eq!(artifact.object_path(), Some(object.as_path()));
    assert!(!fs::read(&object).unwrap().is_empty());
}

#[test]
fn test_artifact_for_other_target() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("add.clif");
    let config = BuildConfig {
        target: Some("aarch64-unknown-linux-gnu".parse().unwrap()),
        ..BuildConfig::default()
    };
    let mut artifact = ArtifactExecutable::new(config, &output);
    artifact.build(&parse(ADD_PROGRAM).module).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("; target aarch64-unknown-linux-gnu"), "{text}");
}

#[test]
fn test_build_project_builds_entry_module() {
    let parsed = parse("return 7;");
    let project = sable_ast::Project::new("demo", parsed.module.clone());
    let mut jit = JitExecutable::default();
    jit.build_project(&project).unwrap();
    assert_eq!(jit.run().unwrap(), 7);
}
