//! Cross-binding import merging.
//!
//! Merge rules are dialect-specific:
//! - Pydantic: `from M import a, b` lines are grouped by module, items
//!   unioned and sorted, modules sorted; whole-module `import M` lines are
//!   deduplicated verbatim, sorted, and appended after the grouped imports.
//!   Output is deterministic regardless of input order.
//! - TypeScript: exact-line dedup, first-occurrence order preserved; no
//!   item-level splitting.

use crate::target::Target;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};

static FROM_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^from\s+(\S+)\s+import\s+(.+?)\s*$").expect("valid regex"));

/// Deduplicating accumulator for import lines across a batch
#[derive(Debug)]
pub enum ImportSet {
    Pydantic {
        /// module -> union of named items (both kept sorted)
        grouped: BTreeMap<String, BTreeSet<String>>,
        /// whole-module import lines, verbatim
        whole: BTreeSet<String>,
    },
    Typescript {
        lines: Vec<String>,
        seen: HashSet<String>,
    },
}

impl ImportSet {
    pub fn new(target: Target) -> Self {
        match target {
            Target::Pydantic => ImportSet::Pydantic {
                grouped: BTreeMap::new(),
                whole: BTreeSet::new(),
            },
            Target::Typescript => ImportSet::Typescript {
                lines: Vec::new(),
                seen: HashSet::new(),
            },
        }
    }

    /// Merge one import line into the set
    pub fn add_line(&mut self, line: &str) {
        match self {
            ImportSet::Pydantic { grouped, whole } => {
                if let Some(caps) = FROM_IMPORT.captures(line) {
                    let items = grouped.entry(caps[1].to_string()).or_default();
                    for item in caps[2].split(',') {
                        let item = item.trim();
                        if !item.is_empty() {
                            items.insert(item.to_string());
                        }
                    }
                } else {
                    whole.insert(line.trim_end().to_string());
                }
            }
            ImportSet::Typescript { lines, seen } => {
                let line = line.trim_end();
                if seen.insert(line.to_string()) {
                    lines.push(line.to_string());
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ImportSet::Pydantic { grouped, whole } => grouped.is_empty() && whole.is_empty(),
            ImportSet::Typescript { lines, .. } => lines.is_empty(),
        }
    }

    /// Render the merged import block, one import per line
    pub fn render(&self) -> String {
        match self {
            ImportSet::Pydantic { grouped, whole } => {
                let mut out: Vec<String> = grouped
                    .iter()
                    .map(|(module, items)| {
                        let items: Vec<&str> = items.iter().map(String::as_str).collect();
                        format!("from {} import {}", module, items.join(", "))
                    })
                    .collect();
                out.extend(whole.iter().cloned());
                out.join("\n")
            }
            ImportSet::Typescript { lines, .. } => lines.join("\n"),
        }
    }
}
