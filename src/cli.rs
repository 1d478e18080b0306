use crate::github_client::{ClientConfig, DEFAULT_API_URL};
use crate::render::RenderOptions;
use clap::{Parser, ValueEnum};
use std::io::IsTerminal;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "github-explorer",
    version,
    about = "Show a GitHub repository's summary and open issues"
)]
pub struct Cli {
    /// Navigation paths to open in order: `/`, `/repositories/owner/name` or `owner/name`
    #[arg(value_name = "PATH", required_unless_present = "interactive")]
    pub paths: Vec<String>,

    /// Read navigation paths from stdin, one per line, re-rendering as data arrives
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to colorize output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Show a line for each fetch that failed
    #[arg(long)]
    pub show_errors: bool,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// API token, sent as `Authorization: token <TOKEN>`
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "GITHUB_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Debug, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            token: self.token.clone().filter(|t| !t.is_empty()),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_errors: self.show_errors,
        }
    }
}

/// Initialize color mode based on CLI choice and environment
pub fn init_color(choice: ColorChoice) {
    let should_color = match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal(),
    };
    colored::control::set_override(should_color);
}
