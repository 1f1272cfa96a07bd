//! Sable compiler driver.
//!
//! Ties the front end (`sable-syntax`, `sable-ast`) to the Cranelift back
//! end (`sable-cranelift`) and renders diagnostics for the command line.

pub mod diagnostics;
pub mod pipeline;

pub use pipeline::{Compilation, PipelineError, check, load_project, parse_source};
