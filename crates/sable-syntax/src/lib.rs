//! Lexer and recursive-descent parser for Sable source text.
//!
//! The parser never fails outright: syntax errors are collected alongside a
//! best-effort concrete syntax tree so later passes can still run.

pub mod cst;
pub mod lexer;
pub mod parser;

pub use cst::{SyntaxKind, SyntaxNode};
pub use lexer::{Token, tokenize};
pub use parser::{Parse, ParseError, parse};
