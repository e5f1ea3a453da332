//! Unified error type surfaced from the crate's public API.

use thiserror::Error;

pub use crate::engine::{CompileError, ParseError};

/// The simulator walks an already-validated NFA and never fails at match
/// time; this variant exists only so `RegexError` has a uniform shape
/// across every compilation stage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {}

/// Unified error type for parse, compile, and evaluation stages.
#[derive(Debug, Error, PartialEq)]
pub enum RegexError {
    /// Parsing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Compilation failed.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// Runtime matching failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}
