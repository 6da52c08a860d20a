//! Bearer credential and its on-disk store.
//!
//! How the token is issued is the backend's business; promodesk only keeps
//! the opaque string and sends it as `Authorization: Bearer <token>` on
//! mutating calls. Workflows receive the credential as an argument and never
//! read the store themselves.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Opaque bearer token proving the caller is an administrator.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] for an empty or blank token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(Error::Unauthorized);
        }
        Ok(Self(token))
    }

    /// Raw token, for building the `Authorization` header.
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// File-backed token store (the CLI's equivalent of a browser session).
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store in the user config directory (`~/.config/promodesk/token` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the platform has no config directory.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("no user config directory on this platform".into()))?;
        Ok(Self::at(dir.join("promodesk").join("token")))
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential, `None` if nothing (or only whitespace) is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<Credential>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Credential::new(content).ok()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(format!("reading {}", self.path.display()), e)),
        }
    }

    /// Persist a credential, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory or file cannot be written.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("creating {}", parent.display()), e))?;
        }
        fs::write(&self.path, credential.token())
            .map_err(|e| Error::io(format!("writing {}", self.path.display()), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| Error::io(format!("restricting {}", self.path.display()), e))?;
        }

        Ok(())
    }

    /// Remove the stored credential. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(format!("removing {}", self.path.display()), e)),
        }
    }
}

/// Pick the credential for this invocation: explicit flag, then environment,
/// then the token store.
///
/// # Errors
///
/// Returns [`Error::Unauthorized`] when no source yields a token, and
/// [`Error::Io`] if the store exists but cannot be read.
pub fn resolve(
    explicit: Option<&str>,
    env_token: Option<&str>,
    store: &TokenStore,
) -> Result<Credential> {
    if let Some(token) = explicit {
        return Credential::new(token);
    }
    if let Some(token) = env_token
        && let Ok(credential) = Credential::new(token)
    {
        return Ok(credential);
    }
    store.load()?.ok_or(Error::Unauthorized)
}
