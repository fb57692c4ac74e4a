//! Delegate surface for schema loading and code lowering.
//!
//! The actual schema→code lowering is performed by an external delegate
//! library; this module defines the seam ([`SchemaDelegate`]) and the
//! production implementation that shells out to a Node.js runner script.
//! Version selection is not part of this surface — it happens through the
//! sandbox's `node_modules/zod` link.

use crate::error::DelegateError;
use crate::target::Target;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Opaque handle to a schema binding materialized inside a sandbox
#[derive(Debug, Clone)]
pub struct SchemaHandle {
    /// Transpiled module the binding lives in
    pub module: PathBuf,
    /// Binding name
    pub name: String,
}

/// Seam to the external schema-conversion delegate.
///
/// Implementations must tolerate being called for bindings that fail to
/// load or lower; a [`DelegateError`] is isolated per binding and never
/// aborts the batch.
pub trait SchemaDelegate: Send + Sync {
    /// Materialize one named binding from the sandboxed module as an
    /// executable schema object.
    fn load_schema(&self, module: &Path, name: &str) -> Result<SchemaHandle, DelegateError>;

    /// Lower a loaded schema into the target dialect, returning code text.
    fn generate(&self, schema: &SchemaHandle, target: Target) -> Result<String, DelegateError>;
}

/// Production delegate invoking a Node.js runner script.
///
/// The runner is called as `node <script> <mode> <module> <name> [target]`
/// with mode `load` or `generate`; generated code arrives on stdout, failure
/// messages on stderr with a non-zero exit status.
#[derive(Debug, Clone)]
pub struct NodeDelegate {
    node_binary: PathBuf,
    runner_script: PathBuf,
}

impl NodeDelegate {
    pub fn new(node_binary: impl Into<PathBuf>, runner_script: impl Into<PathBuf>) -> Self {
        Self {
            node_binary: node_binary.into(),
            runner_script: runner_script.into(),
        }
    }

    fn run(&self, mode: &str, module: &Path, name: &str, extra: &[&str]) -> Result<String, String> {
        let output = Command::new(&self.node_binary)
            .arg(&self.runner_script)
            .arg(mode)
            .arg(module)
            .arg(name)
            .args(extra)
            .output()
            .map_err(|e| format!("failed to spawn node: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            if message.is_empty() {
                return Err(format!("delegate exited with {}", output.status));
            }
            return Err(message.to_string());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SchemaDelegate for NodeDelegate {
    fn load_schema(&self, module: &Path, name: &str) -> Result<SchemaHandle, DelegateError> {
        self.run("load", module, name, &[])
            .map_err(DelegateError::Load)?;
        Ok(SchemaHandle {
            module: module.to_path_buf(),
            name: name.to_string(),
        })
    }

    fn generate(&self, schema: &SchemaHandle, target: Target) -> Result<String, DelegateError> {
        let dialect = target.to_string();
        self.run("generate", &schema.module, &schema.name, &[&dialect])
            .map_err(DelegateError::Generate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failure_is_load_error() {
        let delegate = NodeDelegate::new("/nonexistent/node", "/nonexistent/runner.js");
        let result = delegate.load_schema(Path::new("/tmp/schema.cjs"), "User");
        match result {
            Err(DelegateError::Load(msg)) => assert!(msg.contains("failed to spawn node")),
            other => panic!("expected load error, got {:?}", other),
        }
    }
}
