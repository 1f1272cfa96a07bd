//! Common test utilities for e2e tests.

#![allow(dead_code)]

use std::path::PathBuf;

use sable::{Compilation, parse_source};
use sable_core::SourceFile;
use sable_cranelift::{BuildConfig, Executable, JitExecutable};
use sable_runtime::capture_output;

pub fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

pub fn compile(text: &str) -> Compilation {
    parse_source(SourceFile::new("test.sb", text)).expect("AST construction failed")
}

/// Build `compilation` with the JIT and run it, returning the exit code and
/// the printed lines.
pub fn run_jit(compilation: &Compilation) -> (i32, Vec<String>) {
    assert!(
        !compilation.has_errors(),
        "diagnostics: {:?}",
        compilation.diagnostics
    );
    let mut jit = JitExecutable::new(BuildConfig::default());
    jit.build(&compilation.parsed.module).expect("build failed");
    let (code, printed) = capture_output(|| jit.run());
    (code.expect("run failed"), printed)
}
