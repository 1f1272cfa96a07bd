//! Errors surfaced through the whole pipeline

mod common;

use common::compile;
use sable::diagnostics::{lowering_diagnostic, render_diagnostic};
use sable_core::{CompilationPhase, Position};
use sable_cranelift::{BuildConfig, CompilationErrorKind, Executable, JitExecutable, Outcome};

#[test]
fn test_unresolved_name_is_a_diagnostic() {
    let compilation = compile("fn f(a: int): int { return a; }\nout f(y);");
    assert!(compilation.has_errors());
    let diag = &compilation.diagnostics[0];
    assert_eq!(diag.phase, CompilationPhase::NameResolution);
    assert_eq!(diag.span.start, Position::new(2, 7));

    let rendered = render_diagnostic(diag, &compilation.source, false);
    assert!(rendered.contains("unresolved reference `y`"), "{rendered}");
}

#[test]
fn test_forward_call_fails_with_located_error() {
    let compilation = compile("out add(1, 2);\nfn add(a: int, b: int): int { return a + b; }");
    // Names resolve; only lowering enforces declaration order.
    assert!(!compilation.has_errors());

    let mut jit = JitExecutable::new(BuildConfig::default());
    let error = jit.build(&compilation.parsed.module).unwrap_err();
    let diag = lowering_diagnostic(&error).unwrap();
    assert_eq!(diag.phase, CompilationPhase::Lowering);
    assert_eq!(diag.span.start, Position::new(1, 5));
    assert!(diag.message.starts_with("callee `add` not found"));
}

#[test]
fn test_verification_failure_reports_details_lazily() {
    let compilation = compile("fn f(a: int): int { out a; }\nout f(1);");
    let mut jit = JitExecutable::new(BuildConfig::default());
    let error = jit.build(&compilation.parsed.module).unwrap_err();
    assert!(matches!(
        error.kind(),
        CompilationErrorKind::Verification { .. }
    ));
    assert!(lowering_diagnostic(&error).is_none());

    let result = error.report();
    assert_eq!(result.outcome, Outcome::Error);
    assert!(result.has_details());
    let details = result.details().unwrap();
    assert!(details.contains("function %f"), "{details}");
}
