//! Splits one binding's generated code into import lines and body.

use crate::target::Target;

/// Import lines and remaining body for one binding's generated code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    /// Leading import lines, in order of appearance
    pub imports: Vec<String>,
    /// Everything after the import block, trimmed of blank edges
    pub body: String,
}

/// Separate leading import lines from the body.
///
/// A line counts as an import only while it matches the target dialect's
/// import syntax and no non-import line has been seen yet. The first
/// non-matching line closes the import block permanently — later lines that
/// resemble imports stay in the body.
pub fn split_output(code: &str, target: Target) -> SplitOutput {
    let mut imports = Vec::new();
    let mut body: Vec<&str> = Vec::new();
    let mut header_open = true;

    for line in code.lines() {
        if header_open && target.is_import_line(line) {
            imports.push(line.to_string());
        } else {
            header_open = false;
            body.push(line);
        }
    }

    while body.first().is_some_and(|l| l.trim().is_empty()) {
        body.remove(0);
    }
    while body.last().is_some_and(|l| l.trim().is_empty()) {
        body.pop();
    }

    SplitOutput {
        imports,
        body: body.join("\n"),
    }
}
