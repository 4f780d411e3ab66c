//! Clap derive structures for the `zamdash` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// zamdash -- ticket dashboard metrics for Zammad helpdesks
#[derive(Debug, Parser)]
#[command(
    name = "zamdash",
    version,
    about = "Ticket dashboard metrics for Zammad helpdesks",
    long_about = "Aggregates SLA, backlog, and daily-throughput metrics from a\n\
        Zammad ticket system and renders them as a table or JSON.\n\n\
        Snapshots are cached briefly so repeated invocations within the\n\
        cache window stay cheap for the helpdesk server.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Zammad instance URL (overrides config file)
    #[arg(long, short = 'u', env = "ZAMDASH_URL", global = true)]
    pub url: Option<String>,

    /// Agent login for basic auth
    #[arg(long, env = "ZAMDASH_USERNAME", global = true)]
    pub username: Option<String>,

    /// Agent password
    #[arg(long, env = "ZAMDASH_PASSWORD", global = true, hide_env = true)]
    pub password: Option<String>,

    /// Config file path
    #[arg(long, short = 'c', env = "ZAMDASH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ZAMDASH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ZAMDASH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config file)
    #[arg(long, env = "ZAMDASH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show dashboard metrics
    #[command(alias = "m")]
    Metrics(MetricsArgs),

    /// Report engine liveness (never contacts the ticket source)
    Health,

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  METRICS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Skip the snapshot cache and force a fresh aggregation pass.
    ///
    /// A one-shot CLI run starts with an empty cache, so this only
    /// changes behavior when the service is embedded in a long-lived
    /// process.
    #[arg(long, short = 'r')]
    pub refresh: bool,

    /// Include per-bucket ticket lists, not just the counts
    #[arg(long, short = 'f')]
    pub full: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter config file with default thresholds
    Init,

    /// Display the resolved configuration (password redacted)
    Show,

    /// Print the config file path
    Path,
}
