//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod brands;
mod config_cmd;
mod parse;
mod scrape;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use gridscrape::Config;

#[derive(Parser)]
#[command(name = "gridscrape")]
#[command(about = "Scrape product grids from retail brand pages")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Settings that take precedence over the config file.
#[derive(Args)]
struct Overrides {
    /// Maximum number of brands rendered at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Directory for per-brand JSON output
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Directory for raw rendered HTML
    #[arg(long, global = true)]
    debug_dir: Option<PathBuf>,

    /// Site root URL
    #[arg(long, global = true)]
    base_url: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(dir) = self.debug_dir {
            config.html_debug_dir = dir;
        }
        if let Some(url) = self.base_url {
            config.base_url = url;
        }
    }
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Render the index, then scrape every matching brand
    Scrape {
        /// Brand names to scrape (defaults to the configured list)
        #[arg(short, long = "brand")]
        brands: Vec<String>,
    },

    /// List links on the index page and which brands they match (does not scrape)
    Brands {
        /// Show every on-site link, not only matches
        #[arg(short, long)]
        all: bool,
    },

    /// Extract the product grid from a saved HTML file
    Parse {
        /// Rendered brand page
        html_file: PathBuf,
        /// Write records to this JSON file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };
    cli.overrides.apply(&mut config);

    match cli.command {
        Commands::Scrape { brands } => scrape::cmd_scrape(&config, &brands).await,
        Commands::Brands { all } => brands::cmd_brands(&config, all).await,
        Commands::Parse { html_file, out } => parse::cmd_parse(&html_file, out.as_deref()).await,
        Commands::Config => config_cmd::cmd_config_show(&config),
    }
}
