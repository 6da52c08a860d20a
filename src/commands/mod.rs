//! CLI command implementations for promodesk.
//!
//! Each submodule implements one top-level command:
//!
//! - [`images`] - list, upload, delete, re-date and replace gallery images
//! - [`banner`] - show and update the discount banner
//! - [`slider`] - print the public page
//! - [`auth`] - store or remove the admin token
//! - [`config_cmd`] - validate and print the effective configuration

pub mod auth;
pub mod banner;
pub mod config_cmd;
pub mod images;
pub mod slider;

use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use promodesk::api::{HttpApi, SiteApi};
use promodesk::config::Config;
use promodesk::constants;
use promodesk::credentials::{self, Credential, TokenStore};
use promodesk::ui;

/// Marker for failures whose details were already printed.
#[derive(Debug, thiserror::Error)]
#[error("command failed")]
pub struct AlreadyReported;

/// Shared state for commands that talk to the backend.
pub struct Context {
    pub config: Config,
    pub api: Arc<dyn SiteApi>,
    store: TokenStore,
    token_flag: Option<String>,
}

impl Context {
    /// Validate the configuration and build the HTTP client.
    pub fn new(config: Config, store: TokenStore, token_flag: Option<String>) -> Result<Self> {
        let validation = config.validate()?;
        for warning in &validation.warnings {
            tracing::warn!("{warning}");
        }

        let api = HttpApi::new(&config.api)?;
        Ok(Self {
            config,
            api: Arc::new(api),
            store,
            token_flag,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.api.request_timeout_secs)
    }

    /// Resolve the bearer credential, printing login instructions if none is available.
    pub fn credential(&self) -> Result<Credential> {
        let env_token = std::env::var(constants::TOKEN_ENV).ok();
        credentials::resolve(self.token_flag.as_deref(), env_token.as_deref(), &self.store)
            .map_err(report)
    }
}

/// Print a library error with hints and return the marker error.
pub fn report(err: promodesk::Error) -> anyhow::Error {
    let message = err.user_message();
    if err.is_auth_failure() {
        ui::print_error_box(
            "Not authenticated",
            &message,
            &[
                "Log in with: promodesk auth login --token <TOKEN>",
                "Or pass --token / set PROMODESK_TOKEN for a single command",
            ],
        );
    } else {
        eprintln!("{message}");
    }
    AlreadyReported.into()
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` declines.
pub fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N]: ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
