//! CLI for the topicforge server.

#![allow(missing_docs, reason = "CLI binary with self-explanatory functions")]
#![allow(clippy::print_stdout, reason = "CLI output")]
#![allow(clippy::print_stderr, reason = "CLI error output")]
#![allow(clippy::unwrap_used, reason = "CLI panics are acceptable")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::single_call_fn, reason = "CLI command functions are called once from main")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "topicforge")]
#[command(about = "Durable work-queue and worker pool for LLM-assisted topic ingestion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the HTTP server and worker pool. Default when no subcommand is given.
    Serve,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::run().await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "fatal error");
            if err.downcast_ref::<commands::serve::NoUsableKeys>().is_some() {
                std::process::ExitCode::from(2)
            } else {
                std::process::ExitCode::from(1)
            }
        },
    }
}
