//! scm - source component manager CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scm_cli::cmd;
use scm_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let dry_run = cli.dry_run;

    match cli.command {
        Commands::Login => cmd::login::login().await,
        Commands::Logout => cmd::logout::logout(),
        Commands::Create { name } => {
            cmd::create::create(&name, &std::env::current_dir()?, dry_run)
        }
        Commands::Add {
            components,
            skip_deps,
            force,
        } => cmd::add::add(&components, skip_deps, force, dry_run).await,
        Commands::Publish { path, version } => {
            cmd::publish::publish(&path, version.as_deref(), dry_run).await
        }
        Commands::Update { component } => cmd::update::update(component.as_deref(), dry_run).await,
        Commands::Search { keyword, json } => cmd::search::search(&keyword, json).await,
        Commands::Preview { component } => cmd::preview::preview(&component).await,
        Commands::Fork {
            component,
            new_name,
        } => cmd::fork::fork(&component, &new_name, dry_run).await,
    }
}
