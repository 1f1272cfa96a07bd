//! Command-line interface for the Sable compiler.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sable_cranelift::{BuildConfig, OptLevel};
use target_lexicon::Triple;

#[derive(Parser)]
#[command(name = "sable")]
#[command(about = "Sable programming language compiler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Cranelift optimization level (none, speed, speed_and_size)
    #[arg(long, global = true, default_value_t = OptLevel::None)]
    pub opt_level: OptLevel,

    /// Emit constant arithmetic as written instead of folding it
    #[arg(long, global = true)]
    pub no_fold: bool,

    /// Show progress events and extended error details
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a program and run it in-process
    Run { file: PathBuf },

    /// Write a program's Cranelift IR to a file
    Build {
        file: PathBuf,

        /// Output path (defaults to the input with a `.clif` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target triple (defaults to the host)
        #[arg(long, value_parser = |s: &str| s.parse::<Triple>().map_err(|e| e.to_string()))]
        target: Option<Triple>,

        /// Also write a native object file next to the IR
        #[arg(long)]
        emit_object: bool,
    },

    /// Report syntax and name resolution errors
    Check { file: PathBuf },

    /// Print the AST outline
    Ast { file: PathBuf },
}

impl Cli {
    pub fn config(&self) -> BuildConfig {
        let mut config = BuildConfig {
            opt_level: self.opt_level,
            fold_constants: !self.no_fold,
            ..BuildConfig::default()
        };
        if let Command::Build {
            target,
            emit_object,
            ..
        } = &self.command
        {
            config.target = target.clone();
            config.emit_object = *emit_object;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_flags_reach_config() {
        let cli = Cli::parse_from([
            "sable",
            "build",
            "demo.sb",
            "--target",
            "aarch64-unknown-linux-gnu",
            "--emit-object",
            "--opt-level",
            "speed",
            "--no-fold",
        ]);
        let config = cli.config();
        assert_eq!(config.opt_level, OptLevel::Speed);
        assert!(!config.fold_constants);
        assert!(config.emit_object);
        assert_eq!(
            config.target.map(|t| t.to_string()).as_deref(),
            Some("aarch64-unknown-linux-gnu")
        );
    }

    #[test]
    fn test_run_uses_defaults() {
        let cli = Cli::parse_from(["sable", "run", "demo.sb"]);
        let config = cli.config();
        assert_eq!(config.opt_level, OptLevel::None);
        assert!(config.fold_constants);
        assert!(config.target.is_none());
        assert!(matches!(cli.command, Command::Run { .. }));
    }

    #[test]
    fn test_unknown_opt_level_is_rejected() {
        assert!(Cli::try_parse_from(["sable", "--opt-level", "fast", "run", "a.sb"]).is_err());
    }

    #[test]
    fn test_unknown_target_is_a_usage_error() {
        let err = Cli::try_parse_from(["sable", "build", "a.sb", "--target", "bogus-arch-none"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
