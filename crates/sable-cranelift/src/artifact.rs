//! IR artifacts for an external toolchain.
//!
//! The module is lowered into a `cranelift-object` module for the configured
//! target and written out as CLIF text. Linking it with the `sable-runtime`
//! static archive happens outside this crate.

use std::fs;
use std::path::{Path, PathBuf};

use cranelift_codegen::isa::{self, OwnedTargetIsa};
use cranelift_module::default_libcall_names;
use cranelift_object::{ObjectBuilder, ObjectModule};
use sable_ast::Module as AstModule;
use tracing::debug;

use crate::codegen::{EntryFunction, LoweredModule};
use crate::config::BuildConfig;
use crate::errors::{BoxError, CompilationError, CompilationResult};
use crate::events::ProgressEvents;
use crate::executable::{Executable, lower_into};

/// Look up the ISA for the configured target.
pub fn target_isa(config: &BuildConfig) -> CompilationResult<OwnedTargetIsa> {
    isa::lookup(config.target_triple())
        .box_err()?
        .finish(config.flags()?)
        .box_err()
}

fn object_module(isa: OwnedTargetIsa, name: &str) -> CompilationResult<ObjectModule> {
    let builder = ObjectBuilder::new(isa, name, default_libcall_names()).box_err()?;
    Ok(ObjectModule::new(builder))
}

/// Lower `ast` into a fresh object module without writing anything.
pub fn lower_to_object(
    ast: &AstModule,
    config: &BuildConfig,
) -> CompilationResult<(ObjectModule, LoweredModule)> {
    let mut module = object_module(target_isa(config)?, &ast.name)?;
    let lowered = lower_into(&mut module, config, ast, &ProgressEvents::default())?;
    Ok((module, lowered))
}

pub struct ArtifactExecutable {
    config: BuildConfig,
    events: ProgressEvents,
    output: PathBuf,
    isa: Option<OwnedTargetIsa>,
    artifact: Option<PathBuf>,
    object: Option<PathBuf>,
}

impl ArtifactExecutable {
    pub fn new(config: BuildConfig, output: impl Into<PathBuf>) -> Self {
        Self {
            config,
            events: ProgressEvents::default(),
            output: output.into(),
            isa: None,
            artifact: None,
            object: None,
        }
    }

    /// Path of the IR text written by the last successful build.
    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }

    /// Path of the object file, when one was requested and written.
    pub fn object_path(&self) -> Option<&Path> {
        self.object.as_deref()
    }
}

impl Executable for ArtifactExecutable {
    fn initialize(&mut self) -> CompilationResult<()> {
        if self.isa.is_none() {
            let isa = target_isa(&self.config)?;
            debug!(triple = %isa.triple(), "initialized artifact target");
            self.isa = Some(isa);
        }
        Ok(())
    }

    fn build(&mut self, ast: &AstModule) -> CompilationResult<EntryFunction> {
        self.artifact = None;
        self.object = None;
        self.events.build.emit(
            "build started",
            Some(format!("module {} (artifact)", ast.name)),
        );
        self.initialize()?;
        let isa = self
            .isa
            .clone()
            .ok_or_else(|| CompilationError::precondition("artifact target was not initialized"))?;

        let mut module = object_module(isa.clone(), &ast.name)?;
        let lowered = lower_into(&mut module, &self.config, ast, &self.events)?;

        fs::write(&self.output, lowered.render(isa.triple())).box_err()?;
        debug!(path = %self.output.display(), "wrote IR artifact");
        self.artifact = Some(self.output.clone());

        if self.config.emit_object {
            let path = self.output.with_extension("o");
            let bytes = module.finish().emit().box_err()?;
            fs::write(&path, bytes).box_err()?;
            debug!(path = %path.display(), "wrote object file");
            self.object = Some(path);
        }

        self.events.build.emit(
            "build finished",
            Some(format!("wrote {}", self.output.display())),
        );
        Ok(lowered.entry)
    }

    fn run(&mut self) -> CompilationResult<i32> {
        Err(CompilationError::unsupported(
            "IR artifacts cannot be run in-process; link them with an external toolchain",
        ))
    }

    fn events(&self) -> &ProgressEvents {
        &self.events
    }

    fn events_mut(&mut self) -> &mut ProgressEvents {
        &mut self.events
    }
}
