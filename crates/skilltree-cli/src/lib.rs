//! CLI interface for skilltree.
//!
//! `skilltree` regenerates the skill tree index; `skilltree --check` only
//! verifies it. Exit code is 1 when any error finding exists.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use skilltree_config::Config;
use skilltree_core::{sync_tree, Mode};

mod report;

pub use report::render_report;

#[derive(Parser, Debug)]
#[command(name = "skilltree")]
#[command(about = "Build and validate the skill tree index", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Verify the index is current without writing it
    #[arg(long)]
    pub check: bool,

    /// Workspace root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Config file (defaults to skilltree.toml in the workspace root)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else {
            Mode::Write
        }
    }
}

/// Parse arguments, run the pipeline and print the report.
/// Returns the process exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let workspace_root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    let config = Config::load(&workspace_root, cli.config.as_deref())?;
    debug!("Loaded config: {:?}", config);

    let report = sync_tree(&workspace_root, &config, cli.mode())?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let color = std::io::stdout().is_terminal();
        print!("{}", render_report(&report, &workspace_root, color));
    }

    Ok(report.exit_code())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
