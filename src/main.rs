use clap::{Parser, Subcommand};
use gover::commands::*;
use gover::core::{config::AppConfig, error::Result, print_error};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gover")]
#[command(about = "Inspect and switch tags and branches of deployed git working copies")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to <config dir>/gover/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging and per-project diagnostics
    #[arg(long, global = true)]
    debug: bool,

    /// Skip per-tag and per-branch detail lookups
    #[arg(long, global = true)]
    fast: bool,

    /// Never fetch from remotes, use local references only
    #[arg(long, global = true)]
    skip_fetch: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List enabled projects with their tags and branches
    List {
        /// Project to mark as current (defaults to the first one)
        #[arg(long)]
        project: Option<String>,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Switch a project to a tag or a branch
    Checkout {
        /// Project name
        #[arg(long)]
        project: String,
        /// Tag to check out (detached)
        #[arg(long)]
        tag: Option<String>,
        /// Branch to check out (e.g., "main" or "origin/feature")
        #[arg(long)]
        branch: Option<String>,
    },
    /// Rebuild the cached state of a project
    Refresh {
        /// Project name
        #[arg(long)]
        project: String,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show per-project path, repository and git diagnostics
    Doctor,
    /// Mark every enabled project directory as a trusted git directory
    FixGit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    // Configure logging from --debug or the configured debug switch
    if config.engine.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let result = match cli.command {
        Commands::List { project, json } => execute_list(&config, project, json).await,
        Commands::Checkout {
            project,
            tag,
            branch,
        } => execute_checkout(&config, project, tag, branch).await,
        Commands::Refresh { project, json } => execute_refresh(&config, project, json).await,
        Commands::Doctor => execute_doctor(&config).await,
        Commands::FixGit => execute_fix_git(&config).await,
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

/// Load the configuration file and apply command-line switches on top.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_create(cli.config.as_deref())?;
    config.engine.debug |= cli.debug;
    config.engine.fast_mode |= cli.fast;
    config.engine.skip_fetch |= cli.skip_fetch;
    Ok(config)
}
