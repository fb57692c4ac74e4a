//! Export detection for schema-builder sources.
//!
//! Two independent lexical scans: one for exported top-level bindings
//! assigned from a `z.` builder call, one for all such bindings regardless of
//! export. This is a heuristic, not a parser — bindings declared inside
//! comments, strings, or with unusual formatting are missed. Replacing it
//! with a real tokenizer is an open question tracked in DESIGN.md.

use crate::error::ConvertError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of exported bindings processed per request
pub const MAX_EXPORTS: usize = 10;

static EXPORTED_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*export\s+(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*z\s*\.")
        .expect("valid regex")
});

static ANY_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*z\s*\.",
    )
    .expect("valid regex")
});

/// Exported and non-exported schema bindings found in a source, in scan order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportCatalog {
    /// Bindings declared with `export`, in order of appearance
    pub exported: Vec<String>,
    /// All other schema bindings, in order of appearance
    pub non_exported: Vec<String>,
}

/// Scan source text for schema bindings.
///
/// # Errors
/// Returns `NoExportedSchemas` if no exported binding is found and
/// `TooManyExports` if more than [`MAX_EXPORTS`] are — both before any
/// sandbox work happens.
pub fn detect_exports(source: &str) -> Result<ExportCatalog, ConvertError> {
    let exported: Vec<String> = EXPORTED_BINDING
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .collect();

    if exported.is_empty() {
        return Err(ConvertError::NoExportedSchemas);
    }
    if exported.len() > MAX_EXPORTS {
        return Err(ConvertError::TooManyExports(exported.len()));
    }

    let non_exported = ANY_BINDING
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .filter(|name| !exported.contains(name))
        .collect();

    Ok(ExportCatalog {
        exported,
        non_exported,
    })
}

/// Exported binding names only, without the cap or non-empty checks.
///
/// Used by the sandbox transpiler, which needs the names to build the
/// `module.exports` map.
pub(crate) fn exported_names(source: &str) -> Vec<String> {
    EXPORTED_BINDING
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .collect()
}
