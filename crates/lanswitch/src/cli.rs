//! Clap derive structures for the `lanswitch` daemon.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lanswitch -- overlay switch daemon
#[derive(Debug, Parser)]
#[command(
    name = "lanswitch",
    version,
    about = "Provision bridges, tunnels and DHCP for overlay networks",
    long_about = "Runs one worker per configured network. Each worker owns a Linux\n\
        bridge, its outputs (physical ports, GRE-tap, VXLAN, VLAN\n\
        sub-interfaces), firewall rules and address sets, and optionally a\n\
        DHCP server or a set of IPSec tunnels.",
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
    /// Config file (defaults to /etc/lanswitch/switch.toml or the user config dir)
    #[arg(long, short = 'c', env = "LANSWITCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LANSWITCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output, Color & Log Enums ────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Provision every configured network and run until interrupted
    Run(RunArgs),

    /// Validate the configuration and list its networks
    Check(CheckArgs),

    /// List the IPSec tunnels configured on ipsec networks
    #[command(alias = "tun")]
    Tunnels(TunnelsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Only run the named networks (repeatable)
    #[arg(long = "network", short = 'n')]
    pub networks: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Print the effective configuration as TOML (secrets redacted)
    #[arg(long)]
    pub print: bool,

    /// Also verify that every physical output exists on this host
    #[arg(long)]
    pub links: bool,
}

#[derive(Debug, Args)]
pub struct TunnelsArgs {
    /// Restrict to a single network
    #[arg(long, short = 'n')]
    pub network: Option<String>,

    /// Show pre-shared keys instead of masking them
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
