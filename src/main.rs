//! Sable compiler CLI entry point.

mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command};
use sable::diagnostics::{lowering_diagnostic, print_diagnostic};
use sable::{Compilation, load_project};
use sable_cranelift::{
    ArtifactExecutable, CompilationError, EventStream, Executable, JitExecutable,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config();

    match &cli.command {
        Command::Run { file } => {
            let Some(compilation) = load(file, true) else {
                return ExitCode::FAILURE;
            };
            let mut jit = JitExecutable::new(config);
            if cli.verbose {
                print_events(jit.events_mut());
            }
            let result = jit
                .build(&compilation.parsed.module)
                .and_then(|_| jit.run());
            match result {
                // Exit statuses are a single byte.
                Ok(code) => ExitCode::from(code as u8),
                Err(error) => fail(error, &compilation, cli.verbose),
            }
        }
        Command::Build { file, output, .. } => {
            let Some(compilation) = load(file, true) else {
                return ExitCode::FAILURE;
            };
            let output = output
                .clone()
                .unwrap_or_else(|| file.with_extension("clif"));
            let mut artifact = ArtifactExecutable::new(config, &output);
            if cli.verbose {
                print_events(artifact.events_mut());
            }
            match artifact.build(&compilation.parsed.module) {
                Ok(_) => {
                    println!("wrote {}", output.display());
                    if let Some(object) = artifact.object_path() {
                        println!("wrote {}", object.display());
                    }
                    ExitCode::SUCCESS
                }
                Err(error) => fail(error, &compilation, cli.verbose),
            }
        }
        Command::Check { file } => match load(file, false) {
            Some(compilation) if !compilation.has_errors() => {
                println!("{}: no errors", file.display());
                ExitCode::SUCCESS
            }
            _ => ExitCode::FAILURE,
        },
        Command::Ast { file } => {
            let Some(compilation) = load(file, false) else {
                return ExitCode::FAILURE;
            };
            print!("{}", compilation.parsed.outline());
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("SABLE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load and check `path`, printing its diagnostics. With `strict`, any
/// error makes the file unusable.
fn load(path: &Path, strict: bool) -> Option<Compilation> {
    let (_, compilation) = match load_project(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            return None;
        }
    };
    for diag in &compilation.diagnostics {
        print_diagnostic(diag, &compilation.source);
    }
    if strict && compilation.has_errors() {
        return None;
    }
    Some(compilation)
}

fn print_events(events: &mut sable_cranelift::ProgressEvents) {
    for stream in [&mut events.build, &mut events.run] {
        subscribe_stderr(stream);
    }
}

fn subscribe_stderr(stream: &mut EventStream) {
    stream.subscribe(|event| match &event.detail {
        Some(detail) => eprintln!("  {} ({detail})", event.message),
        None => eprintln!("  {}", event.message),
    });
}

fn fail(error: CompilationError, compilation: &Compilation, verbose: bool) -> ExitCode {
    match lowering_diagnostic(&error) {
        Some(diag) => print_diagnostic(&diag, &compilation.source),
        None => {
            let result = error.report();
            eprintln!("error: {}", result.message());
            if verbose && let Some(details) = result.details() {
                eprintln!("{details}");
            }
        }
    }
    ExitCode::FAILURE
}
