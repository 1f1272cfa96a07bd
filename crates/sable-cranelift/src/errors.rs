//! Error types for Cranelift compilation

use derive_more::{Display, Error, From};
use sable_ast::{InvalidLiteral, StructuralError};
use sable_core::Span;

use crate::report::Deferred;

pub type CompilationResult<T> = Result<T, CompilationError>;

#[derive(Display, Debug, From)]
#[display("{kind}")]
pub struct CompilationError {
    #[from]
    kind: Box<CompilationErrorKind>,
}

impl<E> From<E> for CompilationError
where
    CompilationErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        CompilationError {
            kind: Box::new(CompilationErrorKind::from(error)),
        }
    }
}

impl CompilationError {
    pub fn kind(&self) -> &CompilationErrorKind {
        &self.kind
    }

    pub(crate) fn verification(message: impl Into<String>, details: Option<Deferred>) -> Self {
        CompilationErrorKind::Verification {
            message: message.into(),
            details,
        }
        .into()
    }

    pub(crate) fn precondition(violated: &'static str) -> Self {
        CompilationErrorKind::Precondition(violated).into()
    }

    pub(crate) fn unsupported(feature: &'static str) -> Self {
        CompilationErrorKind::Unsupported(feature).into()
    }

    pub(crate) fn invalid_target(msg: impl std::fmt::Display) -> Self {
        CompilationErrorKind::InvalidTarget(msg.to_string()).into()
    }

    pub(crate) fn other(msg: impl std::fmt::Display) -> Self {
        CompilationErrorKind::Cranelift(msg.to_string()).into()
    }

    /// Source location of the offending node, when the error has one.
    pub fn span(&self) -> Option<Span> {
        match &*self.kind {
            CompilationErrorKind::Semantic(error) => Some(error.span()),
            _ => None,
        }
    }
}

#[derive(Display, Debug)]
pub enum CompilationErrorKind {
    #[display("Internal consistency error: {_0}")]
    Structural(StructuralError),

    #[display("{_0}")]
    Semantic(SemanticError),

    #[display("Verification failed: {message}")]
    Verification {
        message: String,
        details: Option<Deferred>,
    },

    #[display("Precondition violated: {_0}")]
    Precondition(&'static str),

    #[display("Unsupported: {_0}")]
    Unsupported(&'static str),

    #[display("Module error: {_0}")]
    Module(cranelift_module::ModuleError),

    #[display("Code generation error: {_0}")]
    Codegen(String),

    #[display("Cranelift error: {_0}")]
    Cranelift(String),

    #[display("Invalid target: {_0}")]
    InvalidTarget(String),

    #[display("Object generation failed: {_0}")]
    Object(object::write::Error),

    #[display("I/O error: {_0}")]
    Io(std::io::Error),
}

/// Errors in the program being compiled. Lowering stops at the first one.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum SemanticError {
    #[display("unresolved reference `{name}`")]
    UnresolvedReference { name: String, span: Span },

    #[display("callee `{name}` not found; functions must be declared before they are called")]
    CalleeNotFound { name: String, span: Span },

    #[display("`{name}` expects {expected} argument(s) but {found} were given")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[display("cannot determine format for this value")]
    UnsupportedFormat { span: Span },

    #[display("`{name}` is a function, not a value")]
    NotAValue { name: String, span: Span },

    #[display("parameter `{name}` belongs to an enclosing function")]
    CapturedParameter { name: String, span: Span },

    #[display("function `{name}` is already defined")]
    DuplicateFunction { name: String, span: Span },

    #[display("{_0}")]
    InvalidLiteral(#[error(not(source))] InvalidLiteral),

    #[display("unreachable statement after `return`")]
    UnreachableStatement { span: Span },

    #[display("division by zero")]
    DivisionByZero { span: Span },

    #[display("incomplete syntax")]
    IncompleteSyntax { span: Span },
}

impl SemanticError {
    pub fn span(&self) -> Span {
        match self {
            SemanticError::UnresolvedReference { span, .. }
            | SemanticError::CalleeNotFound { span, .. }
            | SemanticError::ArityMismatch { span, .. }
            | SemanticError::UnsupportedFormat { span }
            | SemanticError::NotAValue { span, .. }
            | SemanticError::CapturedParameter { span, .. }
            | SemanticError::DuplicateFunction { span, .. }
            | SemanticError::UnreachableStatement { span }
            | SemanticError::DivisionByZero { span }
            | SemanticError::IncompleteSyntax { span } => *span,
            SemanticError::InvalidLiteral(literal) => literal.span,
        }
    }
}

/// Conversion of cranelift results into [`CompilationResult`].
pub trait BoxError<T> {
    fn box_err(self) -> CompilationResult<T>;
}

impl<T, E> BoxError<T> for Result<T, E>
where
    CompilationErrorKind: From<E>,
{
    fn box_err(self) -> CompilationResult<T> {
        self.map_err(CompilationError::from)
    }
}

impl From<StructuralError> for CompilationErrorKind {
    fn from(error: StructuralError) -> Self {
        CompilationErrorKind::Structural(error)
    }
}

impl From<SemanticError> for CompilationErrorKind {
    fn from(error: SemanticError) -> Self {
        CompilationErrorKind::Semantic(error)
    }
}

impl From<InvalidLiteral> for CompilationErrorKind {
    fn from(error: InvalidLiteral) -> Self {
        CompilationErrorKind::Semantic(SemanticError::InvalidLiteral(error))
    }
}

impl From<cranelift_module::ModuleError> for CompilationErrorKind {
    fn from(error: cranelift_module::ModuleError) -> Self {
        CompilationErrorKind::Module(error)
    }
}

impl From<Box<cranelift_module::ModuleError>> for CompilationErrorKind {
    fn from(error: Box<cranelift_module::ModuleError>) -> Self {
        CompilationErrorKind::Module(*error)
    }
}

impl From<object::write::Error> for CompilationErrorKind {
    fn from(error: object::write::Error) -> Self {
        CompilationErrorKind::Object(error)
    }
}

impl From<cranelift_codegen::settings::SetError> for CompilationErrorKind {
    fn from(error: cranelift_codegen::settings::SetError) -> Self {
        CompilationErrorKind::Cranelift(error.to_string())
    }
}

impl From<cranelift_codegen::isa::LookupError> for CompilationErrorKind {
    fn from(error: cranelift_codegen::isa::LookupError) -> Self {
        CompilationErrorKind::InvalidTarget(error.to_string())
    }
}

impl From<cranelift_codegen::CodegenError> for CompilationErrorKind {
    fn from(error: cranelift_codegen::CodegenError) -> Self {
        CompilationErrorKind::Codegen(error.to_string())
    }
}

impl From<std::io::Error> for CompilationErrorKind {
    fn from(error: std::io::Error) -> Self {
        CompilationErrorKind::Io(error)
    }
}

impl std::error::Error for CompilationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &*self.kind {
            CompilationErrorKind::Structural(e) => Some(e),
            CompilationErrorKind::Semantic(e) => Some(e),
            CompilationErrorKind::Module(e) => Some(e),
            CompilationErrorKind::Object(e) => Some(e),
            CompilationErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}
