//! Safe user-facing diagnostics for per-binding failures.
//!
//! Raw delegate failures carry sandbox paths, internal module aliases, and
//! stack traces. Everything rendered here is stripped of those before being
//! embedded as a comment in the target dialect, positioned where the failing
//! binding's body would have been.

use crate::error::DelegateError;
use crate::target::{Target, ZodVersion};
use once_cell::sync::Lazy;
use regex::Regex;

static NOT_A_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s+is not a function")
        .expect("valid regex")
});

static MODULE_NOT_FOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Cannot find (?:module|package) '([^']+)'"#).expect("valid regex")
});

static ABSOLUTE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:/[\w.$@+~-]+){2,}/?").expect("valid regex"));

/// Internal module alias that must never reach output
const MODULE_ALIAS: &str = "schema.cjs";

/// Format one binding's failure as a comment block in the target dialect.
///
/// Classification is first-match-wins:
/// 1. `<method> is not a function` — the builder method may not exist in the
///    selected zod version;
/// 2. module resolution failure — only the underlying cause is kept;
/// 3. anything else — generic message.
///
/// In every branch absolute paths, the internal module alias, and stack
/// frames are stripped.
pub fn format_diagnostic(
    name: &str,
    err: &DelegateError,
    target: Target,
    version: ZodVersion,
) -> String {
    let raw = first_meaningful_line(err.message());

    let explanation = if let Some(caps) = NOT_A_FUNCTION.captures(&raw) {
        format!(
            "{} is not a function. This method may not exist in zod {}; \
             check the selected schema-library version.",
            sanitize(&caps[1]),
            version
        )
    } else if let Some(caps) = MODULE_NOT_FOUND.captures(&raw) {
        format!("could not resolve module '{}'", sanitize(&caps[1]))
    } else {
        sanitize(&raw)
    };

    let prefix = target.comment_prefix();
    format!("{} Failed to convert `{}`: {}", prefix, name, explanation)
}

/// First line of a message that is neither blank nor a stack frame
fn first_meaningful_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("at "))
        .unwrap_or("unknown failure")
        .to_string()
}

/// Strip absolute temp paths and the internal module alias
fn sanitize(text: &str) -> String {
    let without_paths = ABSOLUTE_PATH.replace_all(text, "<schema module>");
    without_paths.replace(MODULE_ALIAS, "<schema module>")
}
