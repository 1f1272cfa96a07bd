//! Cranelift types used in Sable compilation.
//!
//! Every Sable value, parameter and return is a 64-bit integer.

use cranelift_codegen::ir::AbiParam;
use cranelift_codegen::ir::types::{I64, Type};

pub struct SableTypes;

impl SableTypes {
    pub fn int() -> Type {
        I64
    }

    pub fn int_param() -> AbiParam {
        AbiParam::new(Self::int())
    }
}
