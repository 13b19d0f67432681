//! ABOUTME: Main entry point for the docbro CLI
//! ABOUTME: Parses arguments, sets up tracing, wires the runtime, and dispatches the command

use clap::Parser;
use docbro_cli::cli::Cli;
use docbro_cli::commands::execute_command;
use docbro_cli::config::Runtime;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_tracing(cli.effective_trace());

    if cli.init {
        let paths = docbro_config::prelude::XdgPaths::resolve();
        match Runtime::init_xdg(&paths) {
            Ok(true) => println!("initialized DocBro at {}", paths.config_dir().display()),
            Ok(false) => println!("DocBro is already initialized at {}", paths.config_dir().display()),
            Err(e) => {
                eprintln!("error: failed to initialize: {e}");
                std::process::exit(1);
            }
        }
    }

    let runtime = match Runtime::build(cli.config.clone()) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start: {e}");
            std::process::exit(1);
        }
    };

    let code = execute_command(cli, runtime).await;
    std::process::exit(code);
}

/// Priority: `RUST_LOG` env > `--trace`/`--verbose` flags > default (warn).
/// Tracing output goes to stderr to keep stdout clean for program output.
fn setup_tracing(trace_level: docbro_cli::cli::TraceLevel) {
    use std::io;
    use tracing_subscriber::EnvFilter;

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    } else {
        let level: tracing::Level = trace_level.into();
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}
