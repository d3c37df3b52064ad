//! termgraph CLI - Main entry point

use clap::Parser;
use std::process::ExitCode;
use termgraph_cli::{commands, Cli, Commands, Config};
use termgraph_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use termgraph_ontology::Direction;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Verbose mode logs debug to the console; otherwise only warnings and errors
    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Warn };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("termgraph-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging, so setup failures are ignored.
    // The guard must outlive every log call so file output is flushed.
    let _guard = init_logging(&log_config).ok();

    match execute_command(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

/// Execute the CLI command
///
/// Returns `false` when a yes/no command answered no.
async fn execute_command(cli: &Cli) -> termgraph_cli::Result<bool> {
    let config = Config::resolve(cli)?;

    match &cli.command {
        Commands::Validate => commands::validate::run(&config).await?,

        Commands::Term {
            id,
            include_obsolete,
        } => commands::term::run(&config, id, *include_obsolete).await?,

        Commands::Ancestors { args } => {
            commands::lineage::run(&config, args, Direction::Outgoing).await?
        },

        Commands::Descendants { args } => {
            commands::lineage::run(&config, args, Direction::Incoming).await?
        },

        Commands::IsA { id, ancestor } => {
            return commands::is_a::run(&config, id, ancestor).await;
        },

        Commands::Infer {
            id,
            relation,
            format,
        } => commands::infer::run(&config, id, relation, *format).await?,

        Commands::Export { out_dir, format } => {
            commands::export::run(&config, out_dir, *format).await?
        },

        Commands::Annotations { gaf, check } => {
            commands::annotations::run(&config, gaf, *check).await?
        },
    }

    Ok(true)
}
