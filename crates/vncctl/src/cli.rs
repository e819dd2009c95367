//! Clap derive structures for the `vncctl` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use vnc_core::model::RouteTargetPart;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vncctl -- declarative virtual network management for an SDN controller
#[derive(Debug, Parser)]
#[command(
    name = "vncctl",
    version,
    about = "Reconcile virtual networks on an SDN controller",
    long_about = "Create and update virtual networks on an SDN controller's configuration\n\
        API server. Every operation is idempotent and supports a dry-run mode\n\
        (--test) that performs all reads but no writes.",
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
    /// API server profile to use
    #[arg(long, short = 'p', env = "VNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API server URL (overrides profile)
    #[arg(long, short = 'a', env = "VNC_API_SERVER", global = true)]
    pub api_server: Option<String>,

    /// Pre-issued auth token (overrides the profile's auth mode)
    #[arg(long, env = "VNC_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format [default: table, or `defaults.output` from the config]
    #[arg(long, short = 'o', env = "VNC_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "VNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "VNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Page size for controller listings (0 fetches everything at once)
    #[arg(long, env = "VNC_PAGE_LIMIT", global = true)]
    pub page_limit: Option<u32>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create, update and list virtual networks
    #[command(alias = "net", alias = "vn")]
    Network(NetworkArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Network ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub command: NetworkCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworkCommand {
    /// Ensure a virtual network exists (no-op if it already does)
    Create {
        /// Network name (last fq_name segment)
        name: String,

        /// Owning project [default: admin]
        #[arg(long)]
        project: Option<String>,

        #[command(flatten)]
        desired: DesiredStateArgs,
    },

    /// Apply configuration to an existing virtual network
    Update {
        /// Network name (last fq_name segment)
        name: String,

        /// Owning project
        project: String,

        #[command(flatten)]
        desired: DesiredStateArgs,
    },

    /// List virtual networks known to the controller
    #[command(alias = "ls")]
    List {
        /// Only networks in this domain
        #[arg(long)]
        domain: Option<String>,

        /// Only networks in this project
        #[arg(long)]
        project: Option<String>,
    },
}

/// Desired network configuration: a JSON document overlaid by field flags.
#[derive(Debug, Args)]
pub struct DesiredStateArgs {
    /// Configuration as an inline JSON object
    #[arg(long, short = 'c', conflicts_with = "from_file")]
    pub conf: Option<String>,

    /// Read the configuration JSON object from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,

    /// Owning domain [default: default-domain]
    #[arg(long)]
    pub domain: Option<String>,

    /// Domain of the IPAM to attach subnets under [default: default-domain]
    #[arg(long)]
    pub ipam_domain: Option<String>,

    /// Project of the IPAM [default: default-project]
    #[arg(long)]
    pub ipam_project: Option<String>,

    /// IPAM name [default: default-network-ipam]
    #[arg(long)]
    pub ipam_name: Option<String>,

    /// Subnet network address, e.g. 10.0.0.0 (needs --ip-prefix-len)
    #[arg(long)]
    pub ip_prefix: Option<String>,

    /// Subnet prefix length
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=32))]
    pub ip_prefix_len: Option<u8>,

    /// Route-target AS number or IPv4 address (needs --target)
    #[arg(long)]
    pub asn: Option<RouteTargetPart>,

    /// Route-target number
    #[arg(long)]
    pub target: Option<RouteTargetPart>,

    /// router_external value (JSON literal, e.g. true)
    #[arg(long)]
    pub external: Option<String>,

    /// Allow transit traffic
    #[arg(long)]
    pub allow_transit: Option<bool>,

    /// Forwarding mode
    #[arg(long, value_parser = ["l2_l3", "l2", "l3"])]
    pub forwarding_mode: Option<String>,

    /// Reverse-path forwarding setting
    #[arg(long)]
    pub rpf: Option<String>,

    /// Mark the network as a mirror destination
    #[arg(long)]
    pub mirror_destination: Option<bool>,

    /// Dry run: perform every read but no write
    #[arg(long, env = "VNC_TEST")]
    pub test: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration (secrets masked)
    Show,

    /// Store the active profile's password or token in the system keyring
    SetPassword {
        /// Profile to store the secret for [default: active profile]
        #[arg(long = "for", value_name = "PROFILE")]
        target_profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
