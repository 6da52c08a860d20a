//! promodesk CLI entry point.

mod commands;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use promodesk::config::Config;
use promodesk::credentials::TokenStore;
use promodesk::logging;

#[derive(Parser)]
#[command(name = "promodesk", version, about = "Manage the promo site's dated images and discount banner")]
struct Cli {
    /// Config file (default: ./promodesk.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and PROMODESK_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Bearer token for this invocation (overrides PROMODESK_TOKEN and the stored token)
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the dated image collection
    Images {
        #[command(subcommand)]
        action: ImagesAction,
    },
    /// Show or edit the discount banner
    Banner {
        #[command(subcommand)]
        action: BannerAction,
    },
    /// Print the public page: banner, header texts and slides
    Slider,
    /// Store or remove the admin token
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ImagesAction {
    /// List every image in backend order
    List,
    /// Upload an image with its date
    Upload {
        /// Image file
        file: Option<PathBuf>,
        /// Date shown for the image (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete an image
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Change the date of an image, keeping its file
    SetDate { id: String, date: NaiveDate },
    /// Replace the file of an image, optionally changing its date
    Replace {
        id: String,
        file: PathBuf,
        /// New date (default: keep the current one)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum BannerAction {
    /// Print the stored banner
    Show,
    /// Change banner fields; unspecified fields keep their stored value
    Update {
        #[arg(long)]
        heading: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Discount percentage (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        discount: Option<u8>,
        #[arg(long)]
        date: Option<String>,
        /// New background image
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store a token for later commands
    Login {
        #[arg(long)]
        token: String,
    },
    /// Remove the stored token
    Logout,
    /// Show whether a token is stored
    Status,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the effective configuration and print it
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<commands::AlreadyReported>().is_none() {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.url = url;
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    match cli.verbose {
        0 => {},
        1 => config.logging.level = "info".to_string(),
        _ => config.logging.level = "debug".to_string(),
    }
    logging::init(&config.logging);

    let store = TokenStore::default_location()?;

    match cli.command {
        Commands::Config { action } => commands::config_cmd::execute(&config, action),
        Commands::Auth { action } => commands::auth::execute(&store, action),
        Commands::Images { action } => {
            let ctx = commands::Context::new(config, store, cli.token)?;
            commands::images::execute(&ctx, action).await
        },
        Commands::Banner { action } => {
            let ctx = commands::Context::new(config, store, cli.token)?;
            commands::banner::execute(&ctx, action).await
        },
        Commands::Slider => {
            let ctx = commands::Context::new(config, store, cli.token)?;
            commands::slider::execute(&ctx).await
        },
    }
}
