//! ABOUTME: Command dispatch — one module per subcommand group, mirroring `llmspell-cli::commands`

mod box_cmd;
mod fill;
mod health;
mod serve;
mod shelf;

use docbro_core::error::DocBroError;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::Runtime;

/// Dispatches the parsed subcommand against the wired `Runtime`. Returns the
/// process exit code: `0` on success, otherwise `DocBroError::exit_code()`.
pub async fn execute_command(cli: Cli, runtime: Runtime) -> i32 {
    let output = cli.output;
    let result = match cli.command {
        Commands::Shelf { command } => shelf::run(command, &runtime, cli.force, output),
        Commands::Box { command } => box_cmd::run(command, &runtime, cli.force, output).await,
        Commands::Fill { name, source, depth, rate_limit, follow_external } => {
            fill::run(&runtime, &name, source, depth, rate_limit, follow_external, output).await
        }
        Commands::Serve { admin, host, port, foreground } => {
            serve::run(&runtime, admin, host, port, foreground).await
        }
        Commands::Health { system, services, config, projects } => {
            health::run(&runtime, system, services, config, projects, output).await
        }
    };

    match result {
        Ok(()) => 0,
        Err(err) => report(output, &err),
    }
}

fn report(output: OutputFormat, err: &DocBroError) -> i32 {
    crate::output::print_err(output, err)
}
