//! Clap derive structures for the `dtdesk` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use dtdesk_config::Theme;
use dtdesk_core::ViewPage;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dtdesk -- command-line control panel for dtale-desktop
#[derive(Debug, Parser)]
#[command(
    name = "dtdesk",
    version,
    about = "Manage dtale-desktop data sources and viewers from the command line",
    long_about = "Browse a dtale-desktop server's data sources, start and stop D-Tale\n\
        viewers for individual nodes, edit source layout, and follow live\n\
        updates over the server's push channel.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "DTDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "DTDESK_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DTDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DTDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the server's feature settings
    Settings,

    /// Browse and edit data sources
    #[command(alias = "src")]
    Sources(SourcesArgs),

    /// Start, stop, and inspect node viewers
    #[command(alias = "n")]
    Nodes(NodesArgs),

    /// Reorder sources and toggle their visibility
    Layout(LayoutArgs),

    /// Follow live updates from the push channel
    Watch(WatchArgs),

    /// Read or change the stored theme preference
    Theme(ThemeArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sources ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SourcesArgs {
    #[command(subcommand)]
    pub command: SourcesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SourcesCommand {
    /// List sources in display order
    #[command(alias = "ls")]
    List {
        /// Include hidden sources
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Show one source, including its scripts
    Show {
        /// Source id
        id: String,
    },

    /// Load the next page of a source's nodes
    LoadNodes {
        /// Source id
        id: String,

        /// Nodes to request (defaults to the profile's page size)
        #[arg(long, short = 'l')]
        limit: Option<u32>,
    },

    /// Create a source from script files
    Create(SourceDraftArgs),

    /// Update a source's name or scripts
    Update {
        /// Source id
        id: String,

        #[command(flatten)]
        draft: SourceDraftArgs,
    },
}

/// Draft fields shared by `create` and `update`.
#[derive(Debug, Args)]
pub struct SourceDraftArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// File with the path-listing script
    #[arg(long)]
    pub list_paths: Option<PathBuf>,

    /// File with the data-loading script
    #[arg(long)]
    pub get_data: Option<PathBuf>,

    /// File with the optional save script
    #[arg(long)]
    pub save_data: Option<PathBuf>,
}

// ── Nodes ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NodesArgs {
    #[command(subcommand)]
    pub command: NodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// List a source's nodes
    #[command(alias = "ls")]
    List {
        /// Source id
        source: String,

        /// Only nodes whose path contains this text
        #[arg(long, short = 'f')]
        filter: Option<String>,

        /// Only nodes with a running viewer
        #[arg(long)]
        active: bool,
    },

    /// Start a node's viewer and print its URL
    View {
        /// Node data id
        data_id: String,

        /// Viewer page
        #[arg(long, default_value = "table")]
        page: PageArg,
    },

    /// Stop a node's viewer
    Kill {
        /// Node data id
        data_id: String,
    },

    /// Drop a node's cached data
    ClearCache {
        /// Node data id
        data_id: String,
    },

    /// Build a profile report and wait for it
    Profile {
        /// Node data id
        data_id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PageArg {
    Table,
    Charts,
    Describe,
    Correlations,
}

impl From<PageArg> for ViewPage {
    fn from(page: PageArg) -> Self {
        match page {
            PageArg::Table => ViewPage::Table,
            PageArg::Charts => ViewPage::Charts,
            PageArg::Describe => ViewPage::Describe,
            PageArg::Correlations => ViewPage::Correlations,
        }
    }
}

// ── Layout ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LayoutArgs {
    #[command(subcommand)]
    pub command: LayoutCommand,
}

#[derive(Debug, Subcommand)]
pub enum LayoutCommand {
    /// Show source order and visibility
    Show,

    /// Move a source to a new position (0-based)
    Move {
        /// Source id
        id: String,

        /// Target position
        position: usize,
    },

    /// Show or hide a source
    Toggle {
        /// Source id
        id: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many seconds (default: until Ctrl-C)
    #[arg(long)]
    pub duration: Option<u64>,
}

// ── Theme ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub command: ThemeCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Print the stored theme
    Get,

    /// Store a theme
    Set {
        theme: ThemeArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Add or replace a server profile
    AddProfile {
        /// Profile name
        name: String,

        /// Server URL
        #[arg(long)]
        server: String,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Never open the push channel for this profile
        #[arg(long)]
        no_push: bool,

        /// Nodes per load-nodes call
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
