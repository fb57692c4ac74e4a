/// Remodel CLI - convert a Zod schema file from the command line
///
/// Reads a schema-builder source file and prints (or writes) the converted
/// Pydantic or TypeScript model code. Uses the same conversion pipeline as
/// the API binary.

use clap::Parser;
use remodel::{convert, ConversionRequest, ConverterConfig, NodeDelegate, Target, ZodVersion};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "remodel", version, about = "Convert Zod schemas to Pydantic or TypeScript models")]
struct Cli {
    /// Schema source file to convert
    input: PathBuf,

    /// Output dialect: pydantic or typescript
    #[arg(long, default_value = "pydantic")]
    target: String,

    /// Zod major version to pin: v3 or v4
    #[arg(long, default_value = "v4")]
    zod_version: String,

    /// Write output to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Node binary used by the delegate
    #[arg(long, default_value = "node")]
    node_bin: String,

    /// Delegate runner script
    #[arg(long, default_value = "/opt/remodel/runner.js")]
    runner: String,

    /// Directory containing pinned zod installs (zod-v3, zod-v4)
    #[arg(long)]
    zod_root: Option<PathBuf>,

    /// Execution timeout in seconds
    #[arg(long, default_value_t = 25)]
    timeout: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(message) = run(cli).await {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let target: Target = cli.target.parse()?;
    let zod_version: ZodVersion = cli.zod_version.parse()?;

    let source = std::fs::read_to_string(&cli.input)
        .map_err(|e| format!("Failed to read {}: {}", cli.input.display(), e))?;

    let mut config = ConverterConfig {
        execution_timeout: Duration::from_secs(cli.timeout),
        ..Default::default()
    };
    if let Some(zod_root) = cli.zod_root {
        config.sandbox.zod_install_root = zod_root;
    }

    let delegate = Arc::new(NodeDelegate::new(cli.node_bin, cli.runner));
    let request = ConversionRequest {
        source,
        target,
        zod_version,
    };

    let output = convert(request, delegate, &config)
        .await
        .map_err(|e| e.to_string())?;

    match cli.output {
        Some(path) => std::fs::write(&path, output)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?,
        None => println!("{}", output),
    }

    Ok(())
}
