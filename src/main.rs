mod cli;
mod error;
mod github_client;
mod logging;
mod models;
mod render;
mod route;
mod session;
mod state;
mod view;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use github_client::GithubClient;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use view::RepositoryView;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init();
    cli::init_color(cli.color);

    if let Err(e) = run(cli).await {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    let client = GithubClient::new(&cli.client_config()).context("Failed to build HTTP client")?;
    let view = RepositoryView::new(Arc::new(client));
    let options = cli.render_options();

    let mut out = std::io::stdout();

    if cli.interactive {
        let input = BufReader::new(tokio::io::stdin());
        session::follow(&view, input, &mut out, &options, cli.format).await
    } else {
        session::open_paths(&view, &cli.paths, &mut out, &options, cli.format).await
    }
}
