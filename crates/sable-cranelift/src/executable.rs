//! The build/run protocol shared by every executable kind.

use std::time::Instant;

use cranelift_module::Module;
use sable_ast::{Module as AstModule, Project};

use crate::codegen::{CodeGenerator, EntryFunction, LoweredModule};
use crate::config::BuildConfig;
use crate::errors::CompilationResult;
use crate::events::ProgressEvents;
use crate::runtime::RuntimeFunctions;

/// Something that can be built from a Sable module and then, depending on
/// the kind, run.
///
/// Every call to [`Executable::build`] starts from a fresh Cranelift module;
/// nothing from an earlier build is reused.
pub trait Executable {
    /// Configure the code generation target. Called by `build`.
    fn initialize(&mut self) -> CompilationResult<()>;

    /// Lower and verify `ast`, returning the entry function handle.
    fn build(&mut self, ast: &AstModule) -> CompilationResult<EntryFunction>;

    fn build_project(&mut self, project: &Project) -> CompilationResult<EntryFunction> {
        tracing::debug!(project = %project.name, "building project");
        self.build(project.entry_module())
    }

    /// Execute the last successful build, returning the program's exit code.
    fn run(&mut self) -> CompilationResult<i32>;

    fn events(&self) -> &ProgressEvents;

    fn events_mut(&mut self) -> &mut ProgressEvents;
}

/// Declare the runtime, lower `ast` into `module` and report progress.
pub(crate) fn lower_into<M: Module>(
    module: &mut M,
    config: &BuildConfig,
    ast: &AstModule,
    events: &ProgressEvents,
) -> CompilationResult<LoweredModule> {
    let runtime = RuntimeFunctions::declare_all(module)?;
    events
        .build
        .emit("lowering", Some(format!("module {}", ast.name)));
    let started = Instant::now();
    let lowered = CodeGenerator::new(module, &runtime, config).lower_module(ast)?;
    events.build.emit(
        "lowered",
        Some(format!(
            "{} function(s) in {:.2?}",
            lowered.functions.len(),
            started.elapsed()
        )),
    );
    Ok(lowered)
}
