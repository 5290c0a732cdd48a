//! Binary entry point for the tugstyle CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Are private fields prefixed with '_' in the code around Program.cs?
//! tugstyle infer underscore-fields --file src/Program.cs
//!
//! # List the conventions and their .editorconfig keys
//! tugstyle conventions
//! ```
//!
//! All output is JSON on stdout. Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use tugstyle::cli::run_infer;
use tugstyle::output::{emit_response, ConventionsResponse, ErrorResponse};
use tugstyle::{Convention, StyleError};

// ============================================================================
// CLI Structure
// ============================================================================

/// Infer unwritten style conventions from the surrounding code.
#[derive(Parser, Debug)]
#[command(name = "tugstyle", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Workspace root directory (default: current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Infer one convention for a source file.
    Infer {
        /// Convention name (see `tugstyle conventions`).
        convention: Convention,
        /// Source file, absolute or relative to the workspace.
        #[arg(long)]
        file: PathBuf,
    },
    /// List the conventions tugstyle can infer.
    Conventions,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_json);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let response = ErrorResponse::from_error(&err);
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(err.error_code().code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command.
async fn execute(cli: Cli) -> Result<(), StyleError> {
    match cli.command {
        Command::Infer { convention, file } => {
            let workspace = match cli.global.workspace {
                Some(workspace) => workspace,
                None => std::env::current_dir().map_err(|source| StyleError::Io {
                    path: ".".to_string(),
                    source,
                })?,
            };

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupted, cancelling");
                    on_interrupt.cancel();
                }
            });

            let response = run_infer(&workspace, &file, convention, &cancel).await?;
            emit(&response)
        }
        Command::Conventions => emit(&ConventionsResponse::all()),
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), StyleError> {
    let mut stdout = io::stdout();
    emit_response(response, &mut stdout)
        .and_then(|()| stdout.flush())
        .map_err(|source| StyleError::Io {
            path: "<stdout>".to_string(),
            source,
        })
}
