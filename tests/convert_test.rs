//! Integration tests for the conversion pipeline with a mock delegate

use remodel::{
    convert, ConversionRequest, ConvertError, ConverterConfig, DelegateError, SandboxConfig,
    SchemaDelegate, SchemaHandle, Target, ZodVersion,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Scripted per-binding behavior for the mock delegate
enum MockOutcome {
    Code(String),
    LoadFailure(String),
    Slow(Duration),
}

struct MockDelegate {
    outcomes: HashMap<String, MockOutcome>,
    calls: AtomicUsize,
}

impl MockDelegate {
    fn new(outcomes: Vec<(&str, MockOutcome)>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: outcomes
                .into_iter()
                .map(|(name, outcome)| (name.to_string(), outcome))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SchemaDelegate for MockDelegate {
    fn load_schema(&self, module: &Path, name: &str) -> Result<SchemaHandle, DelegateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcomes.get(name) {
            Some(MockOutcome::LoadFailure(msg)) => Err(DelegateError::Load(msg.clone())),
            Some(MockOutcome::Slow(delay)) => {
                std::thread::sleep(*delay);
                Ok(SchemaHandle {
                    module: module.to_path_buf(),
                    name: name.to_string(),
                })
            }
            _ => Ok(SchemaHandle {
                module: module.to_path_buf(),
                name: name.to_string(),
            }),
        }
    }

    fn generate(&self, schema: &SchemaHandle, _target: Target) -> Result<String, DelegateError> {
        match self.outcomes.get(&schema.name) {
            Some(MockOutcome::Code(code)) => Ok(code.clone()),
            Some(MockOutcome::Slow(_)) => Ok(format!("class {}(BaseModel):\n    pass\n", schema.name)),
            _ => Err(DelegateError::Generate(format!(
                "no scripted output for {}",
                schema.name
            ))),
        }
    }
}

struct TestEnv {
    _install: TempDir,
    root: TempDir,
    config: ConverterConfig,
}

impl TestEnv {
    fn new() -> Self {
        let install = TempDir::new().unwrap();
        fs::create_dir_all(install.path().join("zod-v3")).unwrap();
        fs::create_dir_all(install.path().join("zod-v4")).unwrap();
        let root = TempDir::new().unwrap();

        let config = ConverterConfig {
            sandbox: SandboxConfig {
                sandbox_root: root.path().join("sandboxes"),
                zod_install_root: install.path().to_path_buf(),
            },
            execution_timeout: Duration::from_secs(5),
        };
        Self {
            _install: install,
            root,
            config,
        }
    }

    fn sandbox_count(&self) -> usize {
        fs::read_dir(self.root.path().join("sandboxes"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

fn request(source: &str, target: Target) -> ConversionRequest {
    ConversionRequest {
        source: source.to_string(),
        target,
        zod_version: ZodVersion::V4,
    }
}

fn py_model(name: &str) -> String {
    format!("from pydantic import BaseModel\n\nclass {}(BaseModel):\n    name: str\n", name)
}

#[tokio::test]
async fn test_bodies_in_scan_order_without_notice() {
    let env = TestEnv::new();
    let delegate = MockDelegate::new(vec![
        ("User", MockOutcome::Code(py_model("User"))),
        ("Order", MockOutcome::Code(py_model("Order"))),
        ("Item", MockOutcome::Code(py_model("Item"))),
    ]);
    let source = "\
export const User = z.object({});
export const Order = z.object({});
export const Item = z.object({});
";

    let output = convert(request(source, Target::Pydantic), delegate, &env.config)
        .await
        .unwrap();

    let user = output.find("class User").unwrap();
    let order = output.find("class Order").unwrap();
    let item = output.find("class Item").unwrap();
    assert!(user < order && order < item);
    assert!(!output.contains("not exported"));
}

#[tokio::test]
async fn test_zero_exports_is_error_and_no_sandbox_created() {
    let env = TestEnv::new();
    let delegate = MockDelegate::new(vec![]);

    let result = convert(
        request("const Draft = z.object({});", Target::Pydantic),
        delegate.clone(),
        &env.config,
    )
    .await;

    assert!(matches!(result, Err(ConvertError::NoExportedSchemas)));
    assert_eq!(env.sandbox_count(), 0);
    assert_eq!(delegate.call_count(), 0);
}

#[tokio::test]
async fn test_capacity_error_before_delegate() {
    let env = TestEnv::new();
    let delegate = MockDelegate::new(vec![]);
    let mut source = String::new();
    for i in 0..11 {
        source.push_str(&format!("export const Schema{} = z.string();\n", i));
    }

    let result = convert(request(&source, Target::Pydantic), delegate.clone(), &env.config).await;

    assert!(matches!(result, Err(ConvertError::TooManyExports(11))));
    assert_eq!(delegate.call_count(), 0);
    assert_eq!(env.sandbox_count(), 0);
}

#[tokio::test]
async fn test_unavailable_version_rejected() {
    let install = TempDir::new().unwrap();
    fs::create_dir_all(install.path().join("zod-v3")).unwrap(); // v4 missing
    let root = TempDir::new().unwrap();
    let config = ConverterConfig {
        sandbox: SandboxConfig {
            sandbox_root: root.path().join("sandboxes"),
            zod_install_root: install.path().to_path_buf(),
        },
        execution_timeout: Duration::from_secs(5),
    };
    let delegate = MockDelegate::new(vec![]);

    let result = convert(
        request("export const S = z.string();", Target::Pydantic),
        delegate.clone(),
        &config,
    )
    .await;

    assert!(matches!(
        result,
        Err(ConvertError::UnavailableVersion(ZodVersion::V4))
    ));
    assert_eq!(delegate.call_count(), 0);
}

#[tokio::test]
async fn test_idempotent_output() {
    let env = TestEnv::new();
    let outcomes = || {
        MockDelegate::new(vec![
            ("User", MockOutcome::Code(py_model("User"))),
            ("Order", MockOutcome::Code(py_model("Order"))),
        ])
    };
    let source = "export const User = z.object({});\nexport const Order = z.object({});\n";

    let first = convert(request(source, Target::Pydantic), outcomes(), &env.config)
        .await
        .unwrap();
    let second = convert(request(source, Target::Pydantic), outcomes(), &env.config)
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_enum_dedup_across_differently_named_enums() {
    let env = TestEnv::new();
    let delegate = MockDelegate::new(vec![
        (
            "User",
            MockOutcome::Code(
                "from enum import Enum\n\nclass Color(str, Enum):\n    RED = 'red'\n    GREEN = 'green'\n\nclass User(BaseModel):\n    color: Color\n"
                    .to_string(),
            ),
        ),
        (
            "Theme",
            MockOutcome::Code(
                "from enum import Enum\n\nclass Shade(str, Enum):\n    R = 'red'\n    G = 'green'\n\nclass Theme(BaseModel):\n    shade: Shade\n"
                    .to_string(),
            ),
        ),
    ]);
    let source = "export const User = z.object({});\nexport const Theme = z.object({});\n";

    let output = convert(request(source, Target::Pydantic), delegate, &env.config)
        .await
        .unwrap();

    assert_eq!(output.matches("(str, Enum)").count(), 1);
    assert!(output.contains("class Color"));
    assert!(!output.contains("class Shade"));
}

#[tokio::test]
async fn test_pydantic_import_union_merge() {
    let env = TestEnv::new();
    let delegate = MockDelegate::new(vec![
        (
            "User",
            MockOutcome::Code("from pydantic import BaseModel\n\nclass User(BaseModel):\n    pass\n".to_string()),
        ),
        (
            "Order",
            MockOutcome::Code("from pydantic import Field\n\nclass Order(BaseModel):\n    pass\n".to_string()),
        ),
    ]);
    let source = "export const User = z.object({});\nexport const Order = z.object({});\n";

    let output = convert(request(source, Target::Pydantic), delegate, &env.config)
        .await
        .unwrap();

    assert!(output.contains("from pydantic import BaseModel, Field"));
    assert_eq!(output.matches("from pydantic import").count(), 1);
}

#[tokio::test]
async fn test_partial_failure_is_isolated_and_sanitized() {
    let env = TestEnv::new();
    let delegate = MockDelegate::new(vec![
        ("A", MockOutcome::Code(py_model("A"))),
        (
            "B",
            MockOutcome::LoadFailure(
                "Error: Cannot find module './missing'\n    at Function._load (/tmp/remodel-sandboxes/req-1/schema.cjs:3:1)"
                    .to_string(),
            ),
        ),
        ("C", MockOutcome::Code(py_model("C"))),
    ]);
    let source = "\
export const A = z.object({});
export const B = z.object({});
export const C = z.object({});
";

    let output = convert(request(source, Target::Pydantic), delegate, &env.config)
        .await
        .unwrap();

    let a = output.find("class A").unwrap();
    let b = output.find("# Failed to convert `B`").unwrap();
    let c = output.find("class C").unwrap();
    assert!(a < b && b < c);
    assert!(!output.contains("/tmp"));
    assert!(!output.contains("schema.cjs"));
    assert!(!output.contains("    at "));
}

#[tokio::test]
async fn test_sandbox_reaped_after_success() {
    let env = TestEnv::new();
    let delegate = MockDelegate::new(vec![("User", MockOutcome::Code(py_model("User")))]);

    convert(
        request("export const User = z.object({});", Target::Pydantic),
        delegate,
        &env.config,
    )
    .await
    .unwrap();

    assert_eq!(env.sandbox_count(), 0);
}

#[tokio::test]
async fn test_timeout_returns_distinct_error_and_reaps_sandbox() {
    let env = TestEnv::new();
    let mut config = env.config.clone();
    config.execution_timeout = Duration::from_millis(50);
    let delegate = MockDelegate::new(vec![(
        "Slow",
        MockOutcome::Slow(Duration::from_millis(300)),
    )]);

    let result = convert(
        request("export const Slow = z.object({});", Target::Pydantic),
        delegate,
        &config,
    )
    .await;

    assert!(matches!(result, Err(ConvertError::Timeout)));
    assert_eq!(env.sandbox_count(), 0);

    // Let the abandoned worker finish before its temp dirs vanish
    tokio::time::sleep(Duration::from_millis(400)).await;
}

#[tokio::test]
async fn test_unhandled_notice_names_non_exported() {
    let env = TestEnv::new();
    let delegate = MockDelegate::new(vec![("User", MockOutcome::Code(py_model("User")))]);
    let source = "export const User = z.object({});\nconst Draft = z.object({});\n";

    let output = convert(request(source, Target::Pydantic), delegate, &env.config)
        .await
        .unwrap();

    let notice_start = output.find("# The following schemas were not converted").unwrap();
    assert!(output[notice_start..].contains("Draft"));
    assert!(output[notice_start..].contains("export"));
    // The notice is the final segment
    assert!(output
        .trim_end()
        .ends_with("# Add `export` in front of their declarations to include them."));
}

#[tokio::test]
async fn test_typescript_output_uses_dialect_rules() {
    let env = TestEnv::new();
    let delegate = MockDelegate::new(vec![
        (
            "User",
            MockOutcome::Code(
                "import { ref } from \"./shared\";\n\nenum Role {\n  Admin = \"admin\",\n}\n\ninterface User {\n  role: Role;\n}\n"
                    .to_string(),
            ),
        ),
        (
            "Group",
            MockOutcome::Code(
                "import { ref } from \"./shared\";\n\nenum Kind {\n  Admin = \"admin\",\n}\n\ninterface Group {\n  kind: Kind;\n}\n"
                    .to_string(),
            ),
        ),
    ]);
    let source = "export const User = z.object({});\nexport const Group = z.object({});\nconst Draft = z.object({});\n";

    let output = convert(request(source, Target::Typescript), delegate, &env.config)
        .await
        .unwrap();

    // Exact-line import dedup, one shared enum, // comment notice
    assert_eq!(output.matches("import { ref } from \"./shared\";").count(), 1);
    assert_eq!(output.matches("enum ").count(), 1);
    assert!(output.contains("enum Role"));
    assert!(!output.contains("enum Kind"));
    assert!(output.contains("//   - Draft"));
}
