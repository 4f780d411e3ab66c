mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zamdash_config::Settings;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config and health don't need a ticket source
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Health => commands::health::handle(&cli.global),

        Command::Metrics(args) => {
            let settings = load_settings(&cli.global)?;
            tracing::debug!("dispatching metrics command");
            commands::metrics::handle(args, settings, &cli.global).await
        }
    }
}

/// Load settings from the config file, then apply CLI flag overrides.
fn load_settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    let path = commands::config_cmd::resolved_path(global);
    let mut settings = zamdash_config::load(&path)?;

    if let Some(ref url) = global.url {
        settings.url = Some(url.clone());
    }
    if let Some(ref username) = global.username {
        settings.username = Some(username.clone());
    }
    if let Some(ref password) = global.password {
        settings.password = Some(password.clone());
    }
    if global.insecure {
        settings.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        settings.timeout = timeout;
    }

    // No file and no flags: point the user at `config init`.
    if settings.url.is_none() {
        return Err(CliError::NoConfig {
            path: path.display().to_string(),
        });
    }

    Ok(settings)
}
