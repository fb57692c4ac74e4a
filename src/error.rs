//! Error types for the conversion pipeline.
//!
//! [`ConvertError`] covers failures that end a request; [`DelegateError`]
//! covers per-binding failures, which never escape the per-export loop and
//! are rendered as inline diagnostics instead.

use crate::target::ZodVersion;
use std::fmt;

/// Error type for a whole conversion request
#[derive(Debug, Clone)]
pub enum ConvertError {
    /// Input rejected by pre-validation (empty, too large, denylisted)
    Validation(String),
    /// No exported schema bindings were found in the source
    NoExportedSchemas,
    /// More exported bindings than the per-request cap
    TooManyExports(usize),
    /// The requested zod version is not installed
    UnavailableVersion(ZodVersion),
    /// The internal execution budget expired before the batch finished
    Timeout,
    /// Unanticipated internal fault; detail goes to logs, never to callers
    Internal(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ConvertError::NoExportedSchemas => write!(
                f,
                "No exported schema bindings found. Add `export` in front of \
                 the declarations you want converted."
            ),
            ConvertError::TooManyExports(count) => write!(
                f,
                "Too many exported schemas: found {}, maximum is {} per request",
                count,
                crate::detect::MAX_EXPORTS
            ),
            ConvertError::UnavailableVersion(version) => {
                write!(f, "Requested zod version {} is not installed", version)
            }
            ConvertError::Timeout => write!(
                f,
                "Conversion timed out. Try converting fewer or simpler schemas."
            ),
            // Detail is logged where the fault occurs; callers only see this
            ConvertError::Internal(_) => write!(f, "Internal error during conversion"),
        }
    }
}

impl std::error::Error for ConvertError {}

/// Error from the delegate library for a single binding.
///
/// Carries the raw failure message, which may contain sandbox paths and
/// stack frames; it must pass through the diagnostics formatter before
/// reaching any user-facing output.
#[derive(Debug, Clone)]
pub enum DelegateError {
    /// The named binding could not be loaded from the sandboxed module
    Load(String),
    /// The loaded schema could not be lowered to the target dialect
    Generate(String),
}

impl DelegateError {
    /// Raw failure message, unsanitized
    pub fn message(&self) -> &str {
        match self {
            DelegateError::Load(msg) => msg,
            DelegateError::Generate(msg) => msg,
        }
    }
}

impl fmt::Display for DelegateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegateError::Load(msg) => write!(f, "Schema load failed: {}", msg),
            DelegateError::Generate(msg) => write!(f, "Code generation failed: {}", msg),
        }
    }
}

impl std::error::Error for DelegateError {}
