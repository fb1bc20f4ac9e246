use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mobilehub")]
#[command(about = "Provision and sync an AppSync backend from local snapshots")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root holding mobilehub.json and the backend tree
    #[arg(long, global = true, env = "MOBILEHUB_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// AWS region (overrides mobilehub.json)
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS shared-config profile (overrides mobilehub.json credentials)
    #[arg(long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write mobilehub.json for a new project
    Init(InitArgs),
    /// Manage the AppSync backend feature
    #[command(subcommand)]
    Appsync(AppsyncCommands),
}

#[derive(clap::Args)]
pub struct InitArgs {
    /// Project name, used as the base of generated resource names
    #[arg(long)]
    pub name: String,
}

#[derive(Subcommand)]
pub enum AppsyncCommands {
    /// Write the starter dev snapshot
    Enable,
    /// Remove the dev and current snapshots
    Disable,
    /// Provision the whole backend from the dev snapshot
    Create,
    /// Apply local changes to the provisioned backend
    Update,
    /// Read the provisioned backend back into the current snapshot
    Pull,
    /// Show what an update would change
    Diff,
    /// Print the AppSync console URL of the provisioned API
    Console,
}
