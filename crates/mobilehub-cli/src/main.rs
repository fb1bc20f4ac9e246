use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

use mobilehub_cli::cli::{Cli, Commands};
use mobilehub_cli::commands::{self, Project};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }
    init_tracing(cli.verbose, cli.json_logs);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let region = cli.region.as_deref();
    let profile = cli.profile.as_deref();

    match &cli.command {
        Commands::Init(args) => {
            let config = commands::init(&cli.project_dir, &args.name, region)?;
            println!(
                "Initialised {} in {} ({})",
                config.project_name,
                cli.project_dir.display(),
                config.region
            );
        }
        Commands::Appsync(command) => {
            let project = Project::open(&cli.project_dir, region, profile)?;
            commands::appsync(&project, command).await?;
        }
    }
    Ok(())
}
