//! Clap derive structures for the `rappi` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rappi -- restaurant-side client for the Rappi integration APIs
#[derive(Debug, Parser)]
#[command(
    name = "rappi",
    version,
    about = "Take, reject and watch Rappi orders and toggle store availability",
    long_about = "Command-line client for the Rappi restaurant integrations.\n\n\
        The marketplace API lists, takes and rejects orders; the availability\n\
        API switches whole stores and individual items on and off.",
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
    /// Integration profile to use
    #[arg(long, short = 'p', env = "RAPPI_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Marketplace API root (overrides profile)
    #[arg(long, env = "RAPPI_MARKETPLACE_URL", global = true)]
    pub marketplace_url: Option<String>,

    /// Marketplace partner token
    #[arg(long, env = "RAPPI_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Availability API root, also the OAuth audience (overrides profile)
    #[arg(long, env = "RAPPI_AVAILABILITY_URL", global = true)]
    pub availability_url: Option<String>,

    /// Client-credentials token endpoint (overrides profile)
    #[arg(long, env = "RAPPI_AVAILABILITY_LOGIN_URL", global = true)]
    pub availability_login_url: Option<String>,

    /// Availability client id (overrides profile)
    #[arg(long, env = "RAPPI_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// Availability client secret
    #[arg(long, env = "RAPPI_CLIENT_SECRET", global = true, hide_env = true)]
    pub client_secret: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "RAPPI_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds [default: from config, else 30]
    #[arg(long, env = "RAPPI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, take, reject and watch marketplace orders
    #[command(alias = "o")]
    Orders(OrdersArgs),

    /// Turn whole stores on or off
    #[command(alias = "s")]
    Stores(StoresArgs),

    /// Turn items on or off, per store
    #[command(alias = "i")]
    Items(ItemsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ORDERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: OrdersCommand,
}

#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    /// List pending orders
    #[command(alias = "ls")]
    List,

    /// Accept an order
    Take {
        /// Order ID
        order_id: String,
    },

    /// Reject an order
    Reject {
        /// Order ID
        order_id: String,

        /// Reason sent to the marketplace
        #[arg(long, short = 'r')]
        reason: String,
    },

    /// List cancelled orders
    Cancelled {
        /// Cancellation endpoint, absolute or relative to the marketplace URL
        /// [default: profile cancellations_url]
        url: Option<String>,
    },

    /// Poll for new orders until interrupted
    Watch {
        /// Seconds between polls [default: from config, else 5]
        #[arg(long, short = 'i')]
        interval: Option<u64>,

        /// Also report cancellations from this endpoint
        #[arg(long)]
        cancelled_url: Option<String>,

        /// Poll once and exit
        #[arg(long)]
        once: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STORES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StoresArgs {
    #[command(subcommand)]
    pub command: StoresCommand,
}

#[derive(Debug, Subcommand)]
pub enum StoresCommand {
    /// Switch stores on and off in one request
    Set(ToggleArgs),
}

/// Ids to switch on and off. An id may not appear on both sides.
#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Ids to turn on (repeatable or comma-separated)
    #[arg(long = "on", value_name = "ID", num_args = 1.., value_delimiter = ',')]
    pub turn_on: Vec<String>,

    /// Ids to turn off (repeatable or comma-separated)
    #[arg(long = "off", value_name = "ID", num_args = 1.., value_delimiter = ',')]
    pub turn_off: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ITEMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ItemsArgs {
    #[command(subcommand)]
    pub command: ItemsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ItemsCommand {
    /// Switch items on and off for one store, or for many from a file
    Set {
        /// Store integration id
        #[arg(long, required_unless_present = "from_file")]
        store: Option<String>,

        #[command(flatten)]
        toggle: ToggleArgs,

        /// JSON array of `{store_integration_id, items: {turn_on, turn_off}}`
        #[arg(long, short = 'F', conflicts_with_all = ["store", "turn_on", "turn_off"])]
        from_file: Option<PathBuf>,
    },
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
    /// Print the config file location
    Path,

    /// Display current configuration with secrets masked
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a secret for the active profile in the system keyring
    StoreSecret {
        /// Which secret to store
        kind: SecretArg,

        /// Secret value
        #[arg(long)]
        value: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SecretArg {
    /// Marketplace partner token
    Token,
    /// Availability client secret
    ClientSecret,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
