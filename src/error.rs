// This module defines the error types of the compiler pipeline using the thiserror
// crate. CompileError is the typed error that propagates out of the driver to the
// caller (unsupported shapes for native code, code cache exhaustion, missing
// prerequisite code, front-end errors). Bailout is deliberately not a CompileError:
// it is the optimizer-local "give up on this optimized attempt" signal carried as a
// Result value up to the driver's checkpoint, where it selects the fallback path
// (keep unoptimized code, disable future optimization) instead of failing the call.

use thiserror::Error;

/// Errors that abort a compile call and propagate to the caller.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("parse error: {reason}")]
    Parse { reason: String },

    #[error("unsupported {what} in function '{function}'")]
    Unsupported { what: String, function: String },

    #[error("too many parameters ({count}) for the native calling convention")]
    TooManyParameters { count: usize },

    #[error("function '{name}' has no unoptimized code")]
    MissingCode { name: String },

    #[error("code generation failed: {reason}")]
    Codegen { reason: String },

    #[error("executable code cache exhausted")]
    CodeCacheExhausted,
}

pub type CompileResult<T> = Result<T, CompileError>;

/// An optimizer bailout: the current optimizing compile attempt is abandoned
/// with a descriptive reason. Recovery is the driver's responsibility.
#[derive(Debug, Clone)]
pub struct Bailout {
    pub reason: String,
}

impl Bailout {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl std::fmt::Display for Bailout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FlowGraph Bailout: {}", self.reason)
    }
}
