//! # Remodel: Zod Schema → Model Code Conversion
//!
//! Remodel converts runtime-validated Zod schema sources into equivalent
//! model definitions in one of two target dialects: class-based Pydantic
//! models or structural TypeScript types.
//!
//! ## Features
//!
//! - **Export detection**: lexical scan for exported top-level `z.` bindings
//! - **Sandboxed execution**: per-request ephemeral workspace with a pinned
//!   zod version, reaped on every exit path
//! - **Per-binding isolation**: one failing schema becomes an inline
//!   diagnostic instead of aborting the batch
//! - **Batch assembly**: imports and structurally-duplicate enums are merged
//!   and deduplicated across the whole request
//! - **Safe diagnostics**: sandbox paths, internal aliases, and stack traces
//!   never reach output
//!
//! ## Example
//!
//! ```rust,no_run
//! use remodel::{convert, ConversionRequest, ConverterConfig, NodeDelegate};
//! use remodel::{Target, ZodVersion};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), remodel::ConvertError> {
//! let delegate = Arc::new(NodeDelegate::new("node", "/opt/remodel/runner.js"));
//! let request = ConversionRequest {
//!     source: "export const User = z.object({ name: z.string() });".to_string(),
//!     target: Target::Pydantic,
//!     zod_version: ZodVersion::V4,
//! };
//! let output = convert(request, delegate, &ConverterConfig::default()).await?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```
//!
//! The textual export detector and the upstream denylist are heuristics, not
//! a security boundary; see the module docs in [`detect`] and [`sandbox`].

// Core pipeline modules
pub mod convert;
pub mod delegate;
pub mod detect;
pub mod diagnostics;
pub mod enums;
pub mod error;
pub mod imports;
pub mod sandbox;
pub mod split;
pub mod target;

// Re-export key types
pub use convert::{convert, ConversionRequest, ConverterConfig, DEFAULT_EXECUTION_TIMEOUT};
pub use delegate::{NodeDelegate, SchemaDelegate, SchemaHandle};
pub use detect::{detect_exports, ExportCatalog, MAX_EXPORTS};
pub use diagnostics::format_diagnostic;
pub use enums::EnumRegistry;
pub use error::{ConvertError, DelegateError};
pub use imports::ImportSet;
pub use sandbox::{Sandbox, SandboxConfig, MODULE_FILENAME};
pub use split::{split_output, SplitOutput};
pub use target::{Target, ZodVersion};
