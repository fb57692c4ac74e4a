//! Ephemeral sandbox workspaces for executing user-supplied schema modules.
//!
//! Each request gets a uniquely-named directory containing a CommonJS
//! transpilation of the submitted source and a `node_modules/zod` link
//! resolving to the pinned major version. The directory is removed when the
//! [`Sandbox`] handle drops, on every exit path; cleanup failures are logged
//! and never propagated or retried.
//!
//! This is workspace isolation, not a security boundary: the transpile step
//! and the upstream denylist are textual heuristics.

use crate::detect::exported_names;
use crate::error::ConvertError;
use crate::target::ZodVersion;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filename of the transpiled module inside the sandbox
pub const MODULE_FILENAME: &str = "schema.cjs";

static NAMED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^import\s+\{\s*([^}]*?)\s*\}\s+from\s+['"]([^'"]+)['"];?\s*$"#)
        .expect("valid regex")
});

static DEFAULT_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^import\s+([A-Za-z_$][\w$]*)\s+from\s+['"]([^'"]+)['"];?\s*$"#)
        .expect("valid regex")
});

static NAMESPACE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^import\s+\*\s+as\s+([A-Za-z_$][\w$]*)\s+from\s+['"]([^'"]+)['"];?\s*$"#)
        .expect("valid regex")
});

static EXPORT_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\s*)export\s+(const|let|var)\s+").expect("valid regex"));

/// Filesystem locations used for sandbox construction
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Namespaced area under which per-request directories are created
    pub sandbox_root: PathBuf,
    /// Directory containing the pinned zod installs (`zod-v3`, `zod-v4`)
    pub zod_install_root: PathBuf,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            sandbox_root: std::env::temp_dir().join("remodel-sandboxes"),
            zod_install_root: PathBuf::from("/opt/remodel/zod"),
        }
    }
}

/// Owned handle over one request's ephemeral workspace.
///
/// Exclusively owned by a single request; dropping it removes the directory
/// tree recursively.
#[derive(Debug)]
pub struct Sandbox {
    dir: PathBuf,
    module: PathBuf,
}

impl Sandbox {
    /// Create a workspace for `source` pinned to `version`.
    ///
    /// Verifies the pinned install exists before any directory is made, so
    /// an unavailable version never leaves a workspace behind.
    ///
    /// # Errors
    /// `UnavailableVersion` if the pinned install is missing; `Internal` for
    /// filesystem faults (detail logged here, generic message to callers).
    pub fn create(
        source: &str,
        version: ZodVersion,
        config: &SandboxConfig,
    ) -> Result<Self, ConvertError> {
        let pinned = config.zod_install_root.join(version.install_dir());
        if !pinned.is_dir() {
            return Err(ConvertError::UnavailableVersion(version));
        }

        let dir = config.sandbox_root.join(format!("req-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).map_err(|e| internal("create sandbox dir", &dir, e))?;

        // From here on the directory exists, so wrap the handle first;
        // any later failure still reaps it through Drop.
        let module = dir.join(MODULE_FILENAME);
        let sandbox = Sandbox { dir, module };

        fs::write(&sandbox.module, transpile_to_cjs(source))
            .map_err(|e| internal("write module", &sandbox.module, e))?;

        let node_modules = sandbox.dir.join("node_modules");
        fs::create_dir_all(&node_modules)
            .map_err(|e| internal("create node_modules", &node_modules, e))?;
        link_pinned_version(&pinned, &node_modules.join("zod"))?;

        Ok(sandbox)
    }

    /// Path of the transpiled module inside the workspace
    pub fn module_path(&self) -> &Path {
        &self.module
    }

    /// Workspace directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            // Non-fatal: never surfaced to the caller, never retried
            tracing::warn!("Failed to remove sandbox {}: {}", self.dir.display(), e);
        }
    }
}

#[cfg(unix)]
fn link_pinned_version(pinned: &Path, link: &Path) -> Result<(), ConvertError> {
    std::os::unix::fs::symlink(pinned, link).map_err(|e| internal("link zod", link, e))
}

#[cfg(not(unix))]
fn link_pinned_version(_pinned: &Path, _link: &Path) -> Result<(), ConvertError> {
    tracing::error!("Sandbox version pinning requires a unix platform");
    Err(ConvertError::Internal(
        "version pinning unsupported on this platform".to_string(),
    ))
}

fn internal(what: &str, path: &Path, err: std::io::Error) -> ConvertError {
    // Full detail to logs only; ConvertError::Internal displays generically
    tracing::error!("Sandbox failure ({} {}): {}", what, path.display(), err);
    ConvertError::Internal(format!("{} {}: {}", what, path.display(), err))
}

/// Rewrite an ES-module schema source into a CommonJS module node can run
/// directly.
///
/// Line-oriented and textual: `import` forms become `require` calls, the
/// `export` keyword is stripped from declarations, and a `module.exports`
/// map of the exported names is appended. Good enough for the declaration
/// style the export detector accepts; anything fancier belongs to a real
/// transpiler.
fn transpile_to_cjs(source: &str) -> String {
    let mut out = String::new();
    for line in source.lines() {
        if let Some(caps) = NAMED_IMPORT.captures(line) {
            out.push_str(&format!("const {{ {} }} = require(\"{}\");", &caps[1], &caps[2]));
        } else if let Some(caps) = NAMESPACE_IMPORT.captures(line) {
            out.push_str(&format!("const {} = require(\"{}\");", &caps[1], &caps[2]));
        } else if let Some(caps) = DEFAULT_IMPORT.captures(line) {
            out.push_str(&format!("const {} = require(\"{}\");", &caps[1], &caps[2]));
        } else {
            out.push_str(&EXPORT_KEYWORD.replace(line, "$1$2 "));
        }
        out.push('\n');
    }

    let names = exported_names(source);
    if !names.is_empty() {
        out.push_str(&format!("\nmodule.exports = {{ {} }};\n", names.join(", ")));
    }
    out
}
