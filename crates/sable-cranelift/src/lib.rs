//! Cranelift-based code generation for Sable
//!
//! Lowers an adopted Sable AST into Cranelift IR and either runs it
//! in-process ([`JitExecutable`]) or writes it out for an external toolchain
//! ([`ArtifactExecutable`]).

pub mod artifact;
pub mod cache;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod events;
pub mod executable;
pub mod jit;
pub mod report;
pub mod runtime;
pub mod types;


pub use artifact::ArtifactExecutable;
pub use codegen::{CodeGenerator, EntryFunction, LoweredFunction, LoweredModule};
pub use config::{BuildConfig, OptLevel};
pub use errors::{BoxError, CompilationError, CompilationErrorKind, CompilationResult, SemanticError};
pub use events::{EventStream, ProgressEvent, ProgressEvents};
pub use executable::Executable;
pub use jit::JitExecutable;
pub use report::{CompilerResult, Deferred, Outcome};

use sable_ast::Module as AstModule;

/// Lower a module and render it as CLIF text for the configured target.
pub fn compile_to_ir_text(ast: &AstModule, config: &BuildConfig) -> CompilationResult<String> {
    let (_, lowered) = artifact::lower_to_object(ast, config)?;
    Ok(lowered.render(&config.target_triple()))
}

/// Compile a module to a native object file
pub fn compile_to_object(ast: &AstModule, config: &BuildConfig) -> CompilationResult<Vec<u8>> {
    let (module, _) = artifact::lower_to_object(ast, config)?;
    module.finish().emit().box_err()
}
