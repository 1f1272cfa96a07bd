//! Compilation pipeline for Sable.
//!
//! ```text
//! SourceFile
//!     │
//!     ▼
//! parse_source ─► syntax tree + AST (adopted), parse diagnostics
//!     │
//!     ▼
//! check ─► name resolution diagnostics
//!     │
//!     ▼
//! Executable::build ─► Cranelift module (JIT or IR artifact)
//! ```
//!
//! Syntax errors are recovered from, so a file with errors still produces an
//! AST with placeholder nodes. Lowering such an AST stops at the first
//! placeholder it meets.

use std::path::Path;

use derive_more::{Display, Error, From};
use sable_ast::{AstNode, ParsedModule, Project, StructuralError, collect_references, resolve};
use sable_core::{CompilationPhase, Diagnostic, SourceFile, Span};

#[derive(Debug, Display, Error, From)]
pub enum PipelineError {
    #[display("cannot read source: {_0}")]
    Io(std::io::Error),
    #[display("internal consistency error: {_0}")]
    Structural(StructuralError),
}

/// A parsed and checked source file.
#[derive(Debug)]
pub struct Compilation {
    pub source: SourceFile,
    pub parsed: ParsedModule,
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse `source`, build its AST and collect every diagnostic the front end
/// can produce.
pub fn parse_source(source: SourceFile) -> Result<Compilation, StructuralError> {
    let parsed = sable_ast::parse_module(&source.name(), source.text.clone())?;
    let index = source.line_index();
    let mut diagnostics: Vec<_> = parsed
        .errors
        .iter()
        .map(|error| {
            Diagnostic::error(
                CompilationPhase::Parsing,
                Span::from_range(&index, error.range.clone()),
                error.message.clone(),
            )
        })
        .collect();
    diagnostics.extend(check(&parsed)?);
    Ok(Compilation {
        source,
        parsed,
        diagnostics,
    })
}

/// Report every reference that does not resolve to a visible declaration.
///
/// Placeholders left behind by syntax errors are skipped; the parser has
/// already reported them.
pub fn check(parsed: &ParsedModule) -> Result<Vec<Diagnostic>, StructuralError> {
    let mut diagnostics = Vec::new();
    for reference in collect_references(&parsed.scope())? {
        if reference.data().is_placeholder() || resolve(&reference)?.is_some() {
            continue;
        }
        diagnostics.push(Diagnostic::error(
            CompilationPhase::NameResolution,
            reference.span(),
            format!("unresolved reference `{}`", reference.name()),
        ));
    }
    tracing::debug!(diagnostics = diagnostics.len(), "checked names");
    Ok(diagnostics)
}

/// Read a source file and wrap its module in a [`Project`] named after the
/// file.
pub fn load_project(path: impl AsRef<Path>) -> Result<(Project, Compilation), PipelineError> {
    let source = SourceFile::read(path)?;
    let name = source.name();
    let compilation = parse_source(source)?;
    let project = Project::new(name, compilation.parsed.module.clone());
    Ok((project, compilation))
}
