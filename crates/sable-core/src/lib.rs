//! Sable compiler utilities.
pub mod diagnostic;
pub mod source;
pub mod span;

pub use diagnostic::{CompilationPhase, Diagnostic, DiagnosticSeverity};
pub use source::SourceFile;
pub use span::{LineIndex, Position, Span};
