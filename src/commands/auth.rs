//! `promodesk auth` - manage the stored admin token.

use anyhow::{Context as _, Result};

use promodesk::credentials::{Credential, TokenStore};

use crate::AuthAction;

/// Execute an auth action.
pub fn execute(store: &TokenStore, action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Login { token } => {
            let credential = Credential::new(token).context("Token cannot be empty")?;
            store.save(&credential)?;
            println!("Token saved to {}", store.path().display());
        },
        AuthAction::Logout => {
            if store.clear()? {
                println!("Token removed from {}", store.path().display());
            } else {
                println!("No stored token");
            }
        },
        AuthAction::Status => match store.load()? {
            Some(_) => println!("Token stored at {}", store.path().display()),
            None => println!("Not logged in (no token at {})", store.path().display()),
        },
    }
    Ok(())
}
