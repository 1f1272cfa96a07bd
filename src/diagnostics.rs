//! Diagnostic formatting utilities for the Sable compiler CLI.

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use sable_core::{CompilationPhase, Diagnostic, DiagnosticSeverity, SourceFile};
use sable_cranelift::{CompilationError, CompilationErrorKind};

/// Get the display color for a compilation phase.
pub fn phase_color(phase: &CompilationPhase) -> Color {
    match phase {
        CompilationPhase::Parsing => Color::Red,
        CompilationPhase::AstGeneration => Color::Red,
        CompilationPhase::NameResolution => Color::Yellow,
        CompilationPhase::Lowering => Color::Cyan,
        CompilationPhase::Verification => Color::Magenta,
    }
}

fn report_kind(severity: DiagnosticSeverity) -> ReportKind<'static> {
    match severity {
        DiagnosticSeverity::Error => ReportKind::Error,
        DiagnosticSeverity::Warning => ReportKind::Warning,
        DiagnosticSeverity::Info => ReportKind::Advice,
    }
}

/// Normalize a span to ensure end > start (required by ariadne).
pub fn normalize_span(start: usize, end: usize) -> (usize, usize) {
    (start, end.max(start + 1))
}

/// A source-located diagnostic for a lowering error, if it has a location.
pub fn lowering_diagnostic(error: &CompilationError) -> Option<Diagnostic> {
    let phase = match error.kind() {
        CompilationErrorKind::Semantic(_) => CompilationPhase::Lowering,
        _ => return None,
    };
    Some(Diagnostic::error(phase, error.span()?, error.to_string()))
}

/// Render a diagnostic with ariadne.
pub fn render_diagnostic(diag: &Diagnostic, source: &SourceFile, color: bool) -> String {
    let file_path = source.path.display().to_string();
    let (start, end) = normalize_span(diag.span.offset, diag.span.offset + diag.span.len);
    let config = Config::default()
        .with_color(color)
        .with_index_type(IndexType::Byte);

    let mut out = Vec::new();
    Report::build(report_kind(diag.severity), (file_path.as_str(), start..end))
        .with_config(config)
        .with_code(format!("{:?}", diag.phase))
        .with_message(&diag.message)
        .with_label(
            Label::new((file_path.as_str(), start..end))
                .with_message(&diag.message)
                .with_color(phase_color(&diag.phase)),
        )
        .finish()
        .write((file_path.as_str(), Source::from(source.text.as_ref())), &mut out)
        .ok();
    String::from_utf8_lossy(&out).into_owned()
}

/// Print a diagnostic to stderr using ariadne for pretty output.
pub fn print_diagnostic(diag: &Diagnostic, source: &SourceFile) {
    eprint!("{}", render_diagnostic(diag, source, true));
}
