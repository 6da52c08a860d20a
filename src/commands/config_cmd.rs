//! `promodesk config` - inspect the effective configuration.

use anyhow::Result;

use promodesk::config::Config;

use crate::ConfigAction;

/// Execute a config action.
pub fn execute(config: &Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => {
            let validation = config.validate()?;

            println!("api.url                  = {}", config.api.url);
            println!("api.request_timeout_secs = {}", config.api.request_timeout_secs);
            println!("api.connect_timeout_secs = {}", config.api.connect_timeout_secs);
            println!("logging.level            = {}", config.logging.level);
            println!("logging.json             = {}", config.logging.json);

            if validation.has_warnings() {
                println!();
                for warning in &validation.warnings {
                    println!("warning: {warning}");
                }
            } else {
                println!("\nConfiguration OK");
            }
            Ok(())
        },
    }
}
