//! Compile-time constant analysis.

use crate::error::StructuralError;
use crate::expr::{ArgumentValue, Expression};
use crate::resolve::resolve;

/// Whether `expr` can be evaluated at compile time.
///
/// Literals are constant. A binary operation is constant when both operands
/// are. A call is constant when every argument is and the callee resolves to
/// a pure function. References are never constant.
pub fn is_static_constant(expr: &Expression) -> Result<bool, StructuralError> {
    match expr {
        Expression::Literal(_) => Ok(true),
        Expression::Binary(bin) => {
            Ok(is_static_constant(&bin.left)? && is_static_constant(&bin.right)?)
        }
        Expression::Call(call) => {
            for arg in &call.args {
                if !is_constant_argument(&arg.value)? {
                    return Ok(false);
                }
            }
            Ok(resolve(&call.callee)?.is_some_and(|decl| decl.is_constant()))
        }
        Expression::Reference(_) => Ok(false),
    }
}

fn is_constant_argument(value: &ArgumentValue) -> Result<bool, StructuralError> {
    match value {
        ArgumentValue::Literal(_) => Ok(true),
        ArgumentValue::Expression(expr) => is_static_constant(expr),
        ArgumentValue::Identifier(_) => Ok(false),
    }
}

/// The compile-time value of `expr`, if it is built from literals and
/// arithmetic alone.
///
/// Folding recurses through nested operations. Calls are not evaluated,
/// even to pure functions, and neither are invalid literals or divisions
/// without a value.
pub fn fold(expr: &Expression) -> Option<i64> {
    match expr {
        Expression::Literal(lit) => lit.value().ok(),
        Expression::Binary(bin) => {
            let lhs = fold(&bin.left)?;
            let rhs = fold(&bin.right)?;
            bin.op.op.apply(lhs, rhs)
        }
        Expression::Call(_) | Expression::Reference(_) => None,
    }
}
