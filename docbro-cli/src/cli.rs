//! ABOUTME: Clap argument parsing — hierarchical subcommands over the catalog, fill, and serve surface
//! ABOUTME: Grounded on `llmspell-cli`'s `Cli`/`Commands` architecture (global flags, long_about + EXAMPLES)

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Trace level for logging output (spec §10.B), mapped onto `tracing::Level`
/// the same way `llmspell-cli`'s `TraceLevel` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<TraceLevel> for tracing::Level {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Off | TraceLevel::Error => tracing::Level::ERROR,
            TraceLevel::Warn => tracing::Level::WARN,
            TraceLevel::Info => tracing::Level::INFO,
            TraceLevel::Debug => tracing::Level::DEBUG,
            TraceLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Output format for command results (spec §6: CLI is a human collaborator;
/// MCP's JSON envelope is the machine one, so only `text`/`json` are offered
/// here rather than the wider set a scripting-engine CLI needs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "docbro")]
#[command(version)]
#[command(about = "Local, project-scoped documentation knowledge bases")]
#[command(
    long_about = "DocBro builds, maintains, and queries local documentation knowledge bases.

EXAMPLES:
    docbro shelf create docs --type rag          # Create a shelf
    docbro box create py-docs drag --shelf docs --source https://docs.python.org/3/  # Create a box
    docbro fill py-docs                          # Crawl/index the box's configured source
    docbro serve --admin                         # Run both MCP servers in the foreground
    docbro health --services                     # Check embedder/vector-store health

For more help on specific commands:
    docbro <command> --help"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path (GLOBAL); defaults to the XDG config location.
    #[arg(short = 'c', long, global = true, env = "DOCBRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run first-time setup (create XDG directories and a default settings
    /// file) before executing the command (GLOBAL).
    #[arg(short = 'i', long, global = true)]
    pub init: bool,

    /// Verbose output; shorthand for `--trace debug` (GLOBAL).
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Skip confirmation for destructive operations (GLOBAL).
    #[arg(short = 'F', long, global = true)]
    pub force: bool,

    /// Trace level (GLOBAL).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub trace: TraceLevel,

    /// Output format (GLOBAL).
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage shelves
    #[command(long_about = "Create, list, rename, and delete shelves.

EXAMPLES:
    docbro shelf create docs --type rag --current  # Create and switch to it
    docbro shelf list                              # List every shelf
    docbro shelf current                           # Show the current shelf
    docbro shelf rename docs documentation         # Rename a shelf
    docbro shelf delete old-docs --force           # Delete a non-default shelf")]
    Shelf {
        #[command(subcommand)]
        command: ShelfCommands,
    },

    /// Manage boxes
    #[command(long_about = "Create, list, and maintain boxes within shelves.

EXAMPLES:
    docbro box create py-docs drag --shelf docs --source https://docs.python.org/3/
    docbro box list --shelf docs                   # List boxes on a shelf
    docbro box add py-docs --shelf reference       # Add an existing box to another shelf
    docbro box remove py-docs --shelf reference    # Remove it from that shelf
    docbro box rename py-docs python-docs          # Rename a box
    docbro box inspect python-docs                 # Show configuration and content state
    docbro box delete python-docs --force          # Delete a box and its content")]
    Box {
        #[command(subcommand)]
        command: BoxCommands,
    },

    /// Crawl or index a box's configured source
    #[command(long_about = "Populate a box by crawling (drag) its configured or overridden source.

EXAMPLES:
    docbro fill py-docs                                    # Use the box's configured URL
    docbro fill py-docs --source https://docs.python.org/3/   # Override the seed URL
    docbro fill py-docs --depth 2 --rate-limit 2.0          # Tune crawl limits")]
    Fill {
        /// Box name to fill
        name: String,

        /// Seed URL; defaults to the box's configured `initial_url`
        #[arg(long)]
        source: Option<String>,

        /// Crawl depth limit
        #[arg(long)]
        depth: Option<u32>,

        /// Requests per second against the seed host
        #[arg(long)]
        rate_limit: Option<f64>,

        /// Follow links that leave the seed host
        #[arg(long)]
        follow_external: bool,
    },

    /// Run the MCP servers
    #[command(long_about = "Serve the read-only MCP API and, optionally, the loopback-only admin API.

EXAMPLES:
    docbro serve                          # Read-only server only, foreground
    docbro serve --admin                  # Both servers, foreground
    docbro serve --admin --port 9400      # Override the read-only port
    docbro serve --init                   # Run first-time setup, then serve")]
    Serve {
        /// Also run the loopback-only admin server
        #[arg(long)]
        admin: bool,

        /// Read-only server bind host (overrides settings)
        #[arg(long)]
        host: Option<String>,

        /// Read-only server bind port (overrides settings)
        #[arg(long)]
        port: Option<u16>,

        /// Kept for CLI-surface parity with the spec; `serve` never
        /// daemonizes itself (the shell/init system owns backgrounding).
        #[arg(long)]
        foreground: bool,
    },

    /// Report system, service, configuration, or project health
    #[command(long_about = "Check the health of DocBro's dependencies and configuration.

EXAMPLES:
    docbro health                  # Everything
    docbro health --system         # XDG paths and settings file presence
    docbro health --services       # Embedder and vector store reachability
    docbro health --config         # Effective settings, as loaded
    docbro health --projects       # Shelf/box counts")]
    Health {
        #[arg(long)]
        system: bool,
        #[arg(long)]
        services: bool,
        #[arg(long)]
        config: bool,
        #[arg(long)]
        projects: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ShelfCommands {
    /// Create a new shelf
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum, default_value = "rag")]
        r#type: BoxTypeArg,
        #[arg(long)]
        auto_fill: bool,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Switch to this shelf once created
        #[arg(long)]
        current: bool,
    },

    /// List shelves
    List {
        #[arg(long)]
        current_only: bool,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the current shelf
    Current,

    /// Rename a shelf
    Rename { old_name: String, new_name: String },

    /// Delete a shelf (the system default shelf is protected)
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum BoxCommands {
    /// Create a box and add it to a shelf
    Create {
        name: String,
        #[arg(value_enum)]
        box_type: BoxTypeArg,
        #[arg(long)]
        shelf: String,
        /// Initial source (URL for drag, path for rag/bag)
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// List boxes
    List {
        #[arg(long)]
        shelf: Option<String>,
        #[arg(long, value_enum)]
        r#type: Option<BoxTypeArg>,
    },

    /// Add an existing box to a shelf
    Add {
        name: String,
        #[arg(long)]
        shelf: String,
    },

    /// Remove a box from a shelf (the box itself survives)
    Remove {
        name: String,
        #[arg(long)]
        shelf: String,
    },

    /// Rename a box
    Rename { old_name: String, new_name: String },

    /// Show a box's configuration and content state
    Inspect { name: String },

    /// Delete a box and its chunks/pages
    Delete { name: String },
}

/// Mirrors `docbro_core::shelf::BoxType` as a clap value, since the domain
/// type itself carries no `ValueEnum` derive (domain crates stay clap-free).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoxTypeArg {
    Drag,
    Rag,
    Bag,
}

impl From<BoxTypeArg> for docbro_core::shelf::BoxType {
    fn from(value: BoxTypeArg) -> Self {
        match value {
            BoxTypeArg::Drag => Self::Drag,
            BoxTypeArg::Rag => Self::Rag,
            BoxTypeArg::Bag => Self::Bag,
        }
    }
}

impl Cli {
    /// Effective trace level: `--verbose` is shorthand for `debug` when no
    /// more specific `--trace` value was given.
    #[must_use]
    pub fn effective_trace(&self) -> TraceLevel {
        if self.verbose {
            TraceLevel::Debug
        } else {
            self.trace
        }
    }
}
