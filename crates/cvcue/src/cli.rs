//! Clap derive structures for the `cvcue` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.
//! Only depends on clap and clap_complete so build.rs can include it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cvcue -- query Arista CV-CUE managed access points
#[derive(Debug, Parser)]
#[command(
    name = "cvcue",
    version,
    about = "Query Arista CV-CUE managed access points from the command line",
    long_about = "Authenticates against the CV-CUE REST API with an API key, caches the\n\
        session between runs, and lists managed access points with filters,\n\
        sorting and pagination.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "CVCUE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// CV-CUE API root, e.g. https://tenant.wifi.arista.com/wifi/api
    #[arg(long, env = "CV_CUE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// API key id
    #[arg(long, env = "CV_CUE_KEY_ID", global = true)]
    pub key_id: Option<String>,

    /// API key value
    #[arg(long, env = "CV_CUE_KEY_VALUE", global = true, hide_env_values = true)]
    pub key_value: Option<String>,

    /// Client identifier sent with the API key
    #[arg(long, env = "CV_CUE_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// Session cache file (overrides profile and platform default)
    #[arg(long, env = "CVCUE_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "CVCUE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "CVCUE_INSECURE", global = true)]
    pub insecure: bool,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Output formats for a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageOutput {
    /// Pretty-printed JSON
    Json,
    /// Table of well-known fields
    Table,
    /// One "name - mac" line per device
    Compact,
}

/// Output formats for a full sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepOutput {
    /// Pretty-printed JSON array
    Json,
    /// Table of well-known fields
    Table,
    /// One "name - mac" line per device
    Compact,
    /// Number of devices only
    Count,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CountFrom {
    /// Count the devices actually received
    #[default]
    Local,
    /// Report the server's totalCount (falls back to local)
    Server,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FilterOperatorArg {
    #[default]
    #[value(name = "AND", alias = "and")]
    And,
    #[value(name = "OR", alias = "or")]
    Or,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List one page of managed access points
    #[command(alias = "ls")]
    ListAps(ListApsArgs),

    /// Fetch every managed access point across all pages
    #[command(alias = "all")]
    GetAllAps(GetAllApsArgs),

    /// Manage the cached API session
    Session(SessionArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Query Arguments ───────────────────────────────────────────

/// Filter and sort flags shared by both list commands.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Only active (true) or inactive (false) devices
    #[arg(long, value_parser = clap::builder::BoolishValueParser::new())]
    pub active: Option<bool>,

    /// Device model (repeatable; any of the given models)
    #[arg(long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Device name (repeatable; any of the given names)
    #[arg(long, value_name = "NAME")]
    pub name: Vec<String>,

    /// Advanced filter field:operator:value (repeatable)
    ///
    /// Operators: equals, contains, notContains, greaterThan, lessThan,
    /// greaterThanOrEquals, lessThanOrEquals, notEquals.
    #[arg(long = "filter", value_name = "FIELD:OP:VALUE")]
    pub filters: Vec<String>,

    /// How separate filters combine
    #[arg(long, default_value = "AND")]
    pub filter_operator: FilterOperatorArg,

    /// Field to sort by
    #[arg(long, value_name = "FIELD")]
    pub sortby: Option<String>,

    /// Sort descending (requires --sortby)
    #[arg(long)]
    pub descending: bool,

    /// Restrict to one location
    #[arg(long, value_name = "ID")]
    pub location_id: Option<i64>,

    /// Results per page (1-1000)
    #[arg(long, allow_negative_numbers = true)]
    pub pagesize: Option<i64>,

    /// Offset of the first result
    #[arg(long, allow_negative_numbers = true)]
    pub startindex: Option<i64>,
}

// ── Device Commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListApsArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Ask the server for the total number of matches
    #[arg(long)]
    pub total_count: bool,

    /// Output format
    #[arg(long, short = 'o')]
    pub output: Option<PageOutput>,
}

#[derive(Debug, Args)]
pub struct GetAllApsArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Output format
    #[arg(long, short = 'o')]
    pub output: Option<SweepOutput>,

    /// Source of the number printed by `--output count`
    #[arg(long, default_value = "local")]
    pub count_from: CountFrom,
}

// ── Session Commands ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Log in and cache a new session
    Login,

    /// Show the cached session
    Status {
        /// Also ask the server whether the session is still active
        #[arg(long)]
        remote: bool,
    },

    /// Delete the cached session
    Clear,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
