//! Config subcommand handlers.

use std::path::PathBuf;

use zamdash_config::Settings;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Config file path: `--config` flag wins, then the platform default.
pub fn resolved_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(zamdash_config::config_path)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: write a starter file ──────────────────────────────
        ConfigCommand::Init => {
            let path = resolved_path(global);
            if path.exists() {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists", path.display()),
                });
            }

            let settings = Settings {
                url: global.url.clone().or(Some("https://helpdesk.example.com".into())),
                username: global.username.clone(),
                password: global.password.clone(),
                ..Settings::default()
            };
            zamdash_config::save(&settings, &path)?;

            if !global.quiet {
                eprintln!("Configuration written to {}", path.display());
                eprintln!("Edit the url/username/password, then run: zamdash metrics");
            }
            Ok(())
        }

        // ── Show: resolved settings, password redacted ──────────────
        ConfigCommand::Show => {
            let mut settings = zamdash_config::load(&resolved_path(global))?;
            settings.password = settings.password.map(|_| "<redacted>".into());

            let out = match global.output {
                OutputFormat::Table => format!("{settings:#?}"),
                OutputFormat::Json => output::render_json_pretty(&settings),
                OutputFormat::JsonCompact => output::render_json_compact(&settings),
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&resolved_path(global).display().to_string(), global.quiet);
            Ok(())
        }
    }
}
