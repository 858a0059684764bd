//! Slicknode module synchronization CLI

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use slicknode_sync::commands;
use slicknode_sync::{HttpTransport, ModulePatterns, PresetConfirm, StdinConfirm};

#[derive(Parser)]
#[command(name = "slicknode-sync")]
#[command(about = "Slicknode module dependency synchronization", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project declaration
    Init,
    /// Check whether the local module tree matches the declaration
    Status,
    /// Fetch a bundle and synchronize the module tree
    Sync {
        /// Bundle URL
        url: String,

        /// Install even if the cache already satisfies the declaration
        #[arg(short, long)]
        force: bool,
    },
    /// Remove declared modules
    Remove {
        /// Module names
        #[arg(required = true)]
        names: Vec<String>,

        /// Delete private module directories without prompting
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let patterns = ModulePatterns::default();

    match cli.command {
        Commands::Init => {
            commands::init_project(&std::env::current_dir()?)?;
        }
        Commands::Status => {
            commands::project_status(None, &patterns)?;
        }
        Commands::Sync { url, force } => {
            let transport = HttpTransport::new();
            commands::sync_project(
                None,
                &url,
                &transport,
                &patterns,
                commands::SyncOptions { force },
            )?;
        }
        Commands::Remove { names, yes } => {
            if yes {
                commands::remove_modules(None, &names, &patterns, &PresetConfirm(true))?;
            } else {
                commands::remove_modules(None, &names, &patterns, &StdinConfirm)?;
            }
        }
    }

    Ok(())
}
