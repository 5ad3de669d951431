//! Import map command-line tool
//!
//! Resolves specifiers against an import map and edits maps stored as JSON.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "importmap")]
#[command(about = "Resolve and edit import maps", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose output (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a specifier against an import map
    Resolve {
        /// Specifier as written in an import statement
        specifier: String,
        /// Import map file (.json or .html)
        #[arg(short, long)]
        map: PathBuf,
        /// URL or path of the importing file
        #[arg(short, long, default_value = "./")]
        from: String,
        /// Base URL of the import map
        #[arg(short, long)]
        base: Option<String>,
        /// Order scopes by path length instead of segment count
        #[arg(long)]
        longest_scope: bool,
    },

    /// Validate an import map and report dropped entries
    Check {
        /// Import map file (.json or .html)
        file: PathBuf,
        /// Fail when any entry is invalid
        #[arg(long)]
        strict: bool,
    },

    /// Add a package to the import map
    Add {
        /// Package specifier (e.g., "react", "react@18.2.0", "react@^18")
        package: String,
        #[command(flatten)]
        target: MapTarget,
    },

    /// Move a mapped package to another version
    Update {
        /// Package name
        package: String,
        /// Version, range or dist-tag
        version: String,
        #[command(flatten)]
        target: MapTarget,
    },

    /// Remove a package from the import map
    Remove {
        /// Package name
        package: String,
        #[command(flatten)]
        target: MapTarget,
    },

    /// Drop redundant scoped entries and empty scopes
    Tidy {
        #[command(flatten)]
        target: MapTarget,
    },
}

/// Map file and generator config shared by the editing commands
#[derive(clap::Args)]
struct MapTarget {
    /// Import map file to rewrite
    #[arg(short, long, default_value = "importmap.json")]
    map: PathBuf,
    /// Generator config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    // -v takes precedence over RUST_LOG
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve {
            specifier,
            map,
            from,
            base,
            longest_scope,
        } => commands::resolve::execute(&specifier, &map, &from, base.as_deref(), longest_scope),

        Commands::Check { file, strict } => commands::check::execute(&file, strict),

        Commands::Add { package, target } => {
            commands::add::execute(&package, &target.map, target.config.as_deref())
        }

        Commands::Update {
            package,
            version,
            target,
        } => commands::update::execute(&package, &version, &target.map, target.config.as_deref()),

        Commands::Remove { package, target } => {
            commands::remove::execute(&package, &target.map, target.config.as_deref())
        }

        Commands::Tidy { target } => commands::tidy::execute(&target.map, target.config.as_deref()),
    }
}
