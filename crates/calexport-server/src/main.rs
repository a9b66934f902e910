//! calexport CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calexport_core::{TracingConfig, init_tracing};
use calexport_server::cli::{Cli, Command};
use calexport_server::commands;
use calexport_server::config::ServerConfig;
use calexport_server::error::ServerResult;
use calexport_server::export::FieldSelection;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ServerResult<()> {
    let config = commands::load_config(cli.config.as_deref())?;
    init_logging(&cli, &config);

    match cli.command {
        Command::Serve { bind, records } => commands::serve::run(config, bind, records).await,
        Command::Export {
            entity_type,
            entity_id,
            start,
            end,
            location,
            description,
            output,
        } => {
            let selection = FieldSelection::new(start, end)
                .with_location(location)
                .with_description(description);
            commands::export::ics(
                &config,
                &entity_type,
                &entity_id,
                &selection,
                output.as_deref(),
            )
        }
        Command::Links { view, entity_id } => commands::export::links(&config, &view, &entity_id),
        Command::CheckConfig => commands::config::check(&config),
    }
}

fn init_logging(cli: &Cli, config: &ServerConfig) {
    let logging = match (&cli.command, cli.debug) {
        (_, true) => TracingConfig::cli_debug(),
        (Command::Serve { .. }, false) => TracingConfig::server().with_format(config.log_format),
        _ => TracingConfig::cli(),
    };

    if let Err(e) = init_tracing(logging) {
        eprintln!("warning: {}", e);
    }
}
