//! Enum block extraction and structural deduplication.
//!
//! Enum-like blocks are lifted out of per-binding bodies and registered by
//! value signature: the ordered concatenation of the block's literal values,
//! member names ignored. The first block seen for a signature is canonical;
//! any later block with the same signature is dropped entirely, so
//! identically-valued enums with different names collapse to one shared
//! definition.

use crate::target::Target;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static PY_ENUM_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^class\s+[A-Za-z_]\w*\s*\(\s*(?:str\s*,\s*)?Enum\s*\)\s*:\s*$")
        .expect("valid regex")
});

static PY_ENUM_MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\s+)[A-Za-z_]\w*\s*=\s*("[^"]*"|'[^']*'|-?\d+(?:\.\d+)?)\s*$"#)
        .expect("valid regex")
});

static TS_ENUM_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?enum\s+[A-Za-z_$][\w$]*\s*\{\s*$").expect("valid regex")
});

static TS_ENUM_MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\s+)[A-Za-z_$][\w$]*\s*=\s*("[^"]*"|'[^']*'|-?\d+(?:\.\d+)?)\s*,?\s*$"#)
        .expect("valid regex")
});

/// Registry of enum definitions keyed by value signature, first occurrence
/// wins; preserves insertion order for rendering.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    defs: IndexMap<String, String>,
}

/// One extracted block: its line span within the body and its value signature
struct EnumBlock {
    start: usize,
    /// exclusive
    end: usize,
    signature: String,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lift all enum blocks out of `body`, registering new signatures and
    /// dropping structurally duplicate blocks. Returns the body with every
    /// block removed.
    pub fn extract(&mut self, body: &str, target: Target) -> String {
        let lines: Vec<&str> = body.lines().collect();
        let mut kept: Vec<&str> = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            match scan_block(&lines, i, target) {
                Some(block) => {
                    if !self.defs.contains_key(&block.signature) {
                        let definition = lines[block.start..block.end].join("\n");
                        self.defs.insert(block.signature, definition);
                    }
                    // Duplicate signatures are dropped from the body too
                    i = block.end;
                }
                None => {
                    kept.push(lines[i]);
                    i += 1;
                }
            }
        }

        while kept.first().is_some_and(|l| l.trim().is_empty()) {
            kept.remove(0);
        }
        while kept.last().is_some_and(|l| l.trim().is_empty()) {
            kept.pop();
        }
        kept.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Canonical definitions in first-seen order
    pub fn definitions(&self) -> Vec<&str> {
        self.defs.values().map(String::as_str).collect()
    }
}

/// Try to read an enum block starting at `start`. A block begins at a header
/// line and continues while lines are blank or match a single literal-value
/// assignment at equal-or-deeper indentation than the first member; the
/// first line breaking both conditions ends it (for TypeScript, that line
/// must be the closing brace, which belongs to the block).
fn scan_block(lines: &[&str], start: usize, target: Target) -> Option<EnumBlock> {
    let header = match target {
        Target::Pydantic => &PY_ENUM_HEADER,
        Target::Typescript => &TS_ENUM_HEADER,
    };
    if !header.is_match(lines[start]) {
        return None;
    }

    let mut values: Vec<String> = Vec::new();
    let mut base_indent: Option<usize> = None;
    let mut last_member = start;
    let mut i = start + 1;

    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }
        let Some((indent, value)) = member_line(line, target) else {
            break;
        };
        match base_indent {
            None => base_indent = Some(indent),
            Some(base) if indent < base => break,
            Some(_) => {}
        }
        values.push(value);
        last_member = i;
        i += 1;
    }

    if values.is_empty() {
        return None;
    }

    let end = match target {
        Target::Pydantic => last_member + 1,
        Target::Typescript => {
            // The block is only an enum if the breaking line closes it
            let trimmed = lines.get(i).map(|l| l.trim());
            if trimmed == Some("}") || trimmed == Some("};") {
                i + 1
            } else {
                return None;
            }
        }
    };

    Some(EnumBlock {
        start,
        end,
        signature: values.join("|"),
    })
}

fn member_line(line: &str, target: Target) -> Option<(usize, String)> {
    let member = match target {
        Target::Pydantic => &PY_ENUM_MEMBER,
        Target::Typescript => &TS_ENUM_MEMBER,
    };
    member
        .captures(line)
        .map(|caps| (caps[1].len(), caps[2].to_string()))
}
