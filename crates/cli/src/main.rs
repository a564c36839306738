mod config;
mod serve;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use orgchart_core::{decode_submission, structure_hierarchy, validate_hierarchy, HierarchyError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServeConfig;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Employee hierarchy structuring toolkit.
#[derive(Parser)]
#[command(name = "orgchart", version, about = "Employee hierarchy structuring toolkit")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Structure an employee -> supervisor JSON file and print the numbered hierarchy
    Structure {
        /// Path to the JSON file, or `-` for stdin
        file: PathBuf,
    },

    /// Validate an employee -> supervisor JSON file without numbering it
    Check {
        /// Path to the JSON file, or `-` for stdin
        file: PathBuf,
    },

    /// Start the orgchart HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Largest accepted request body in bytes (falls back to ORGCHART_MAX_BODY_BYTES)
        #[arg(long)]
        max_body_bytes: Option<usize>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Structure { file } => cmd_structure(&file, cli.output, cli.quiet),
        Commands::Check { file } => cmd_check(&file, cli.output, cli.quiet),
        Commands::Serve {
            port,
            host,
            max_body_bytes,
        } => {
            let config = ServeConfig::from_env(host, port, max_body_bytes);
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("error: failed to create tokio runtime: {e}");
                    process::exit(1);
                }
            };
            if let Err(e) = rt.block_on(serve::start_server(config)) {
                eprintln!("error: server failed: {e}");
                process::exit(1);
            }
        }
    }
}

/// Install the global subscriber: `RUST_LOG` filtering, events on stderr.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "orgchart=info,orgchart_core=info,orgchart_storage=info".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_input(path: &Path) -> Result<Vec<u8>, String> {
    if path.as_os_str() == "-" {
        let mut raw = Vec::new();
        std::io::stdin()
            .read_to_end(&mut raw)
            .map_err(|e| format!("error reading stdin: {e}"))?;
        return Ok(raw);
    }
    std::fs::read(path).map_err(|e| format!("error reading file '{}': {e}", path.display()))
}

fn cmd_structure(path: &Path, output: OutputFormat, quiet: bool) {
    let raw = read_or_exit(path, output, quiet);
    let structured = match decode_submission(&raw).and_then(structure_hierarchy) {
        Ok(s) => s,
        Err(e) => {
            report_rejection(&e, output, quiet);
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&structured) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            report_error(&format!("error serializing hierarchy: {e}"), output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_check(path: &Path, output: OutputFormat, quiet: bool) {
    let raw = read_or_exit(path, output, quiet);
    let hierarchy = match decode_submission(&raw).and_then(validate_hierarchy) {
        Ok(h) => h,
        Err(e) => {
            report_rejection(&e, output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    let root = hierarchy.root_names().into_iter().next().unwrap_or_default();
    let employees = hierarchy.employee_count();
    match output {
        OutputFormat::Text => println!("ok: {employees} employees under {root}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({"valid": true, "root": root, "employees": employees})
        ),
    }
}

fn read_or_exit(path: &Path, output: OutputFormat, quiet: bool) -> Vec<u8> {
    match read_input(path) {
        Ok(raw) => raw,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn report_rejection(err: &HierarchyError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {err}"),
        OutputFormat::Json => {
            let mut body = serde_json::json!({"error": err.kind(), "message": err.to_string()});
            if let Some(names) = err.names() {
                body["names"] = serde_json::json!(names);
            }
            eprintln!("{body}");
        }
    }
}

fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {msg}"),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({"error": msg})),
    }
}
