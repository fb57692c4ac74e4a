//! Target dialect and schema-library version tags.
//!
//! Every representation-specific rule in the pipeline (import syntax, enum
//! block shape, comment prefix) dispatches off [`Target`], so the per-dialect
//! behavior lives here instead of being scattered across the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static PY_IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:from\s+\S+\s+import\s+.+|import\s+\S+.*)$").expect("valid regex")
});

static TS_IMPORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+.+$").expect("valid regex"));

/// Output dialect for generated model code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Class-based Pydantic models (Python)
    Pydantic,
    /// Structural TypeScript types
    Typescript,
}

impl Target {
    /// Comment prefix used when embedding diagnostics and notices in output
    pub fn comment_prefix(&self) -> &'static str {
        match self {
            Target::Pydantic => "#",
            Target::Typescript => "//",
        }
    }

    /// Returns true if `line` matches this dialect's import syntax.
    ///
    /// Matching is positional: the line must start with the import form,
    /// with no leading indentation.
    pub fn is_import_line(&self, line: &str) -> bool {
        match self {
            Target::Pydantic => PY_IMPORT_LINE.is_match(line),
            Target::Typescript => TS_IMPORT_LINE.is_match(line),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Pydantic => write!(f, "pydantic"),
            Target::Typescript => write!(f, "typescript"),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pydantic" | "python" => Ok(Target::Pydantic),
            "typescript" | "ts" => Ok(Target::Typescript),
            other => Err(format!(
                "Unknown target '{}' (expected 'pydantic' or 'typescript')",
                other
            )),
        }
    }
}

/// Supported zod major versions.
///
/// Version selection happens through the sandbox's `node_modules/zod` link,
/// never as a delegate call parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZodVersion {
    #[serde(rename = "v3")]
    V3,
    #[serde(rename = "v4")]
    V4,
}

impl ZodVersion {
    /// Directory name of the pinned install under the zod install root
    pub fn install_dir(&self) -> &'static str {
        match self {
            ZodVersion::V3 => "zod-v3",
            ZodVersion::V4 => "zod-v4",
        }
    }
}

impl fmt::Display for ZodVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZodVersion::V3 => write!(f, "v3"),
            ZodVersion::V4 => write!(f, "v4"),
        }
    }
}

impl FromStr for ZodVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "3" | "v3" => Ok(ZodVersion::V3),
            "4" | "v4" => Ok(ZodVersion::V4),
            other => Err(format!(
                "Unsupported zod version '{}' (expected 'v3' or 'v4')",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_prefix() {
        assert_eq!(Target::Pydantic.comment_prefix(), "#");
        assert_eq!(Target::Typescript.comment_prefix(), "//");
    }

    #[test]
    fn test_pydantic_import_lines() {
        assert!(Target::Pydantic.is_import_line("from pydantic import BaseModel"));
        assert!(Target::Pydantic.is_import_line("import datetime"));
        assert!(!Target::Pydantic.is_import_line("class User(BaseModel):"));
        assert!(!Target::Pydantic.is_import_line("    from enum import Enum"));
    }

    #[test]
    fn test_typescript_import_lines() {
        assert!(Target::Typescript.is_import_line("import { z } from \"zod\";"));
        assert!(!Target::Typescript.is_import_line("interface User {"));
        assert!(!Target::Typescript.is_import_line("from pydantic import BaseModel"));
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("pydantic".parse::<Target>(), Ok(Target::Pydantic));
        assert_eq!("TS".parse::<Target>(), Ok(Target::Typescript));
        assert!("java".parse::<Target>().is_err());
    }

    #[test]
    fn test_version_install_dir() {
        assert_eq!(ZodVersion::V3.install_dir(), "zod-v3");
        assert_eq!(ZodVersion::V4.install_dir(), "zod-v4");
    }
}
