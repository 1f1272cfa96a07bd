//! In-process execution through `cranelift-jit`.

use cranelift_codegen::isa::OwnedTargetIsa;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::default_libcall_names;
use sable_ast::Module as AstModule;
use sable_runtime::{OUT_INT_SYMBOL, sable_out_int};
use target_lexicon::Triple;
use tracing::debug;

use crate::codegen::EntryFunction;
use crate::config::BuildConfig;
use crate::errors::{BoxError, CompilationError, CompilationResult};
use crate::events::ProgressEvents;
use crate::executable::{Executable, lower_into};

struct JitState {
    module: JITModule,
    entry: EntryFunction,
}

/// Native executable: builds into JIT memory and runs the entry function
/// on the calling thread.
pub struct JitExecutable {
    config: BuildConfig,
    events: ProgressEvents,
    isa: Option<OwnedTargetIsa>,
    state: Option<JitState>,
}

impl JitExecutable {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            events: ProgressEvents::default(),
            isa: None,
            state: None,
        }
    }

    pub fn is_built(&self) -> bool {
        self.state.is_some()
    }

    fn release(&mut self) {
        if let Some(state) = self.state.take() {
            debug!(entry = %state.entry.symbol, "releasing JIT memory");
            // SAFETY: no function pointer obtained from this module outlives
            // `run`, and the state has been taken so nothing can call into it.
            unsafe { state.module.free_memory() };
        }
    }
}

impl Default for JitExecutable {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}

impl Executable for JitExecutable {
    fn initialize(&mut self) -> CompilationResult<()> {
        if let Some(target) = &self.config.target
            && *target != Triple::host()
        {
            return Err(CompilationError::invalid_target(format!(
                "the JIT can only run on the host ({}), not {target}",
                Triple::host()
            )));
        }
        if self.isa.is_none() {
            let isa_builder = cranelift_native::builder().map_err(CompilationError::invalid_target)?;
            let isa = isa_builder.finish(self.config.flags()?).box_err()?;
            debug!(triple = %isa.triple(), "initialized JIT target");
            self.isa = Some(isa);
        }
        Ok(())
    }

    fn build(&mut self, ast: &AstModule) -> CompilationResult<EntryFunction> {
        self.release();
        self.events
            .build
            .emit("build started", Some(format!("module {} (jit)", ast.name)));
        self.initialize()?;
        let isa = self
            .isa
            .clone()
            .ok_or_else(|| CompilationError::precondition("JIT target was not initialized"))?;

        let mut builder = JITBuilder::with_isa(isa, default_libcall_names());
        builder.symbol(OUT_INT_SYMBOL, sable_out_int as *const u8);
        let mut module = JITModule::new(builder);

        let lowered = match lower_into(&mut module, &self.config, ast, &self.events)
            .and_then(|lowered| module.finalize_definitions().box_err().map(|()| lowered))
        {
            Ok(lowered) => lowered,
            Err(error) => {
                // SAFETY: nothing from this module was ever handed out.
                unsafe { module.free_memory() };
                return Err(error);
            }
        };

        let entry = lowered.entry;
        self.events
            .build
            .emit("build finished", Some(format!("entry `{}`", entry.symbol)));
        self.state = Some(JitState {
            module,
            entry: entry.clone(),
        });
        Ok(entry)
    }

    fn run(&mut self) -> CompilationResult<i32> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| CompilationError::precondition("run requires a successful build"))?;
        self.events
            .run
            .emit("running", Some(format!("entry `{}`", state.entry.symbol)));

        let code = state.module.get_finalized_function(state.entry.id);
        // SAFETY: the entry function was declared as `fn() -> i64` with the
        // host's default calling convention and has been finalized.
        let entry = unsafe { std::mem::transmute::<*const u8, extern "C" fn() -> i64>(code) };
        let exit_code = entry() as i32;

        self.events
            .run
            .emit("finished", Some(format!("exit code {exit_code}")));
        Ok(exit_code)
    }

    fn events(&self) -> &ProgressEvents {
        &self.events
    }

    fn events_mut(&mut self) -> &mut ProgressEvents {
        &mut self.events
    }
}

impl Drop for JitExecutable {
    fn drop(&mut self) {
        self.release();
    }
}
