//! Runtime function declarations
//!
//! Imports for the helpers exported by `sable-runtime`.

use cranelift_module::{FuncId, Linkage, Module};
use sable_runtime::OUT_INT_SYMBOL;

use crate::errors::{BoxError, CompilationResult};
use crate::types::SableTypes;

/// Runtime function IDs within one module.
pub struct RuntimeFunctions {
    /// `sable_out_int(value: i64)`
    pub out_int: FuncId,
}

impl RuntimeFunctions {
    /// Declare all runtime functions in the module
    pub fn declare_all<M: Module>(module: &mut M) -> CompilationResult<Self> {
        let mut sig = module.make_signature();
        sig.params.push(SableTypes::int_param());
        let out_int = module
            .declare_function(OUT_INT_SYMBOL, Linkage::Import, &sig)
            .box_err()?;
        Ok(Self { out_int })
    }

    pub fn symbols() -> &'static [&'static str] {
        &[OUT_INT_SYMBOL]
    }
}
