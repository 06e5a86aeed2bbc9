use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

/// A completer could not load a symbol's declaration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("failed to complete `{symbol}`: {message}")]
pub struct CompletionError {
    pub symbol: SmolStr,
    pub message: String,
}

impl CompletionError {
    pub fn new(symbol: impl Into<SmolStr>, message: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            message: message.into(),
        }
    }
}

/// Recoverable misuse of the type representation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A write-once field was written a second time with a different value.
    #[error("{field} of `{ty}` is already set")]
    AlreadySet { field: &'static str, ty: String },
    #[error("expected a {expected}, found `{found}`")]
    UnexpectedVariant { expected: &'static str, found: String },
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Abort on a broken internal invariant.
///
/// These are compiler bugs, not user errors, so they are never turned into a `Result`.
#[track_caller]
pub(crate) fn invariant_violation(message: impl fmt::Display) -> ! {
    tracing::error!(target: "dpj.types", %message, "internal invariant violated");
    panic!("internal error: {message}");
}
