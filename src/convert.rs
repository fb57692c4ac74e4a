//! Conversion orchestration: detection, sandboxed execution, per-export
//! dispatch, and final assembly.
//!
//! Each request is handled independently. The per-binding loop is strictly
//! sequential and shares one internal execution budget, sized to fire before
//! a typical transport timeout so a stalled delegate yields a specific
//! message instead of a dropped connection. On expiry the core stops waiting
//! but cannot halt the delegate's underlying work — no cancellation reaches
//! it; that is a documented limitation.

use crate::delegate::SchemaDelegate;
use crate::detect::{detect_exports, ExportCatalog};
use crate::diagnostics::format_diagnostic;
use crate::enums::EnumRegistry;
use crate::error::ConvertError;
use crate::imports::ImportSet;
use crate::sandbox::{Sandbox, SandboxConfig};
use crate::split::split_output;
use crate::target::{Target, ZodVersion};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default internal execution budget; strictly below the 30s transport
/// timeout the API binary assumes.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(25);

/// One conversion request, pre-validated upstream (size/line caps, denylist)
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionRequest {
    /// Raw schema-builder source text
    pub source: String,
    /// Output dialect
    pub target: Target,
    /// Pinned schema-library major version
    pub zod_version: ZodVersion,
}

/// Converter settings shared across requests
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub sandbox: SandboxConfig,
    /// Internal execution budget for the whole per-request batch
    pub execution_timeout: Duration,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            sandbox: SandboxConfig::default(),
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }
}

/// One exported binding's outcome, occupying a fixed slot in scan order
#[derive(Debug)]
struct ExportResult {
    name: String,
    /// Generated code, or a formatted diagnostic comment
    outcome: Result<String, String>,
}

/// Convert every exported schema binding in `request.source` into the target
/// dialect.
///
/// Expected failures come back as [`ConvertError`]; a failure confined to a
/// single binding never aborts the batch and is embedded as a diagnostic
/// comment instead. The sandbox workspace is created after structural
/// validation and reaped on every exit path, including timeout.
pub async fn convert(
    request: ConversionRequest,
    delegate: Arc<dyn SchemaDelegate>,
    config: &ConverterConfig,
) -> Result<String, ConvertError> {
    let catalog = detect_exports(&request.source)?;
    let sandbox = Sandbox::create(&request.source, request.zod_version, &config.sandbox)?;

    let module = sandbox.module_path().to_path_buf();
    let names = catalog.exported.clone();
    let target = request.target;
    let version = request.zod_version;

    let batch = tokio::task::spawn_blocking(move || {
        convert_batch(&names, &module, target, version, delegate.as_ref())
    });

    let results = match tokio::time::timeout(config.execution_timeout, batch).await {
        Ok(Ok(results)) => results,
        Ok(Err(join_err)) => {
            tracing::error!("Conversion worker failed: {}", join_err);
            return Err(ConvertError::Internal(join_err.to_string()));
        }
        Err(_) => {
            // The blocking task keeps running; we only stop waiting for it.
            // The sandbox is reaped on this path too.
            tracing::warn!(
                "Conversion timed out after {:?} ({} exports)",
                config.execution_timeout,
                catalog.exported.len()
            );
            return Err(ConvertError::Timeout);
        }
    };

    Ok(assemble(&results, &catalog, target))
}

/// Sequentially load and convert each binding, isolating per-binding failure.
///
/// A slow binding eats into the shared budget of the ones after it; order is
/// scan order, so the effect is deterministic.
fn convert_batch(
    names: &[String],
    module: &Path,
    target: Target,
    version: ZodVersion,
    delegate: &dyn SchemaDelegate,
) -> Vec<ExportResult> {
    names
        .iter()
        .map(|name| {
            let outcome = delegate
                .load_schema(module, name)
                .and_then(|schema| delegate.generate(&schema, target))
                .map_err(|err| {
                    tracing::debug!("Binding '{}' failed: {}", name, err);
                    format_diagnostic(name, &err, target, version)
                });
            ExportResult {
                name: name.clone(),
                outcome,
            }
        })
        .collect()
}

/// Concatenate merged imports, merged enums, per-binding bodies in scan
/// order, and the unhandled-schemas notice, in that fixed order.
fn assemble(results: &[ExportResult], catalog: &ExportCatalog, target: Target) -> String {
    let mut imports = ImportSet::new(target);
    let mut enums = EnumRegistry::new();
    let mut bodies: Vec<String> = Vec::new();

    for result in results {
        match &result.outcome {
            Ok(code) => {
                let split = split_output(code, target);
                for line in &split.imports {
                    imports.add_line(line);
                }
                bodies.push(enums.extract(&split.body, target));
            }
            Err(diagnostic) => bodies.push(diagnostic.clone()),
        }
        tracing::trace!("Assembled binding '{}'", result.name);
    }

    let mut sections: Vec<String> = Vec::new();
    sections.extend(enums.definitions().iter().map(|d| d.to_string()));
    sections.extend(bodies.into_iter().filter(|b| !b.is_empty()));
    if !catalog.non_exported.is_empty() {
        sections.push(unhandled_notice(&catalog.non_exported, target));
    }

    let mut output = String::new();
    if !imports.is_empty() {
        output.push_str(&imports.render());
        if !sections.is_empty() {
            output.push_str("\n\n");
        }
    }
    output.push_str(&sections.join("\n\n"));
    output
}

/// Trailing comment block naming the bindings that were skipped for lacking
/// an `export` keyword
fn unhandled_notice(names: &[String], target: Target) -> String {
    let prefix = target.comment_prefix();
    let mut lines = vec![format!(
        "{} The following schemas were not converted because they are not exported:",
        prefix
    )];
    for name in names {
        lines.push(format!("{}   - {}", prefix, name));
    }
    lines.push(format!(
        "{} Add `export` in front of their declarations to include them.",
        prefix
    ));
    lines.join("\n")
}
