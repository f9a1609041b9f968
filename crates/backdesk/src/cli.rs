//! Clap derive structures for the `backdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use backdesk_api::{CredentialScope, SortOrder};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// backdesk -- admin console for the backdesk service API
#[derive(Debug, Parser)]
#[command(
    name = "backdesk",
    version,
    about = "Administer users, orders, and services from the command line",
    long_about = "A CLI for the backdesk admin REST API.\n\n\
        Lists, inspects, creates, updates, and deletes records of any\n\
        resource the API exposes, with typed views for users, orders,\n\
        and services.",
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
    #[arg(long, short = 'p', env = "BACKDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "BACKDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Administrative key for this invocation only (not stored)
    #[arg(long, env = "BACKDESK_ADMIN_KEY", global = true, hide_env_values = true)]
    pub admin_key: Option<String>,

    /// Keep credentials in this file instead of the profile's backend
    #[arg(long, env = "BACKDESK_CREDENTIALS_FILE", global = true)]
    pub credentials_file: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BACKDESK_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BACKDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BACKDESK_TIMEOUT", global = true)]
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
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an API key for later commands
    Login(LoginArgs),

    /// Forget a stored API key
    Logout(LogoutArgs),

    /// Show whether an administrative key is stored
    Status,

    /// Manage users
    #[command(alias = "user")]
    Users(ResourceArgs),

    /// Manage orders
    #[command(alias = "order")]
    Orders(ResourceArgs),

    /// Manage services
    #[command(alias = "svc")]
    Services(ResourceArgs),

    /// Operate on any resource by name (e.g. `admin/users`, `services`)
    #[command(alias = "res")]
    Resource(NamedResourceArgs),

    /// Show dashboard statistics
    Stats,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    /// Administrative key, sent to `/admin/*` resources
    Admin,
    /// Service key, sent to public service resources
    Service,
}

impl From<ScopeArg> for CredentialScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Admin => CredentialScope::Admin,
            ScopeArg::Service => CredentialScope::Service,
        }
    }
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Which key to store
    #[arg(long, value_enum, default_value = "admin")]
    pub scope: ScopeArg,

    /// Key value (prompted for when omitted)
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Debug, Args)]
pub struct LogoutArgs {
    /// Which key to forget
    #[arg(long, value_enum, default_value = "admin")]
    pub scope: ScopeArg,
}

// ── Resources ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Args)]
pub struct NamedResourceArgs {
    /// Resource path relative to the API base URL
    pub name: String,

    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List records
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get one record
    Get {
        /// Record ID
        id: String,
    },

    /// Get several records by ID
    GetMany {
        /// Record IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// List records referencing another record
    Refs {
        /// Foreign-key field on this resource (e.g. `user_id`)
        #[arg(long)]
        target: String,

        /// ID of the referenced record
        #[arg(long)]
        id: String,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Create a record
    Create(PayloadArgs),

    /// Update a record
    Update {
        /// Record ID
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Apply the same update to several records
    UpdateMany {
        /// Record IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record ID
        id: String,
    },

    /// Delete several records
    DeleteMany {
        /// Record IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
}

// ── Shared List Arguments ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(order: SortArg) -> Self {
        match order {
            SortArg::Asc => SortOrder::Asc,
            SortArg::Desc => SortOrder::Desc,
        }
    }
}

/// Shared pagination, sorting, and filtering arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Records per page
    #[arg(long, short = 'l', default_value = "10")]
    pub per_page: u32,

    /// Field to sort by
    #[arg(long, short = 's')]
    pub sort: Option<String>,

    /// Sort direction
    #[arg(long, value_enum, default_value = "asc")]
    pub order: SortArg,

    /// Filter as KEY=VALUE (repeatable). JSON values are decoded.
    #[arg(long, short = 'f', value_name = "KEY=VALUE")]
    pub filter: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// JSON object payload
    #[arg(long, conflicts_with = "from_file", required_unless_present = "from_file")]
    pub data: Option<String>,

    /// Read the JSON payload from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (e.g. `api_url`, `timeout`, `credential_backend`)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
