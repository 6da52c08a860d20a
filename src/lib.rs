//! promodesk - admin client for the promo site backend.
//!
//! The library exposes:
//!
//! - [`api`] - typed client for the backend REST surface ([`api::SiteApi`])
//! - [`gallery`] - the image gallery manager and its edit session
//! - [`banner`] - discount banner editor
//! - [`slider`] - public slider read side (settings, images, navigation)
//! - [`credentials`] - bearer credential and token store
//! - [`config`] - TOML configuration with environment overrides
//!
//! The `promodesk` binary wires these into a CLI.

pub mod api;
pub mod banner;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod gallery;
pub mod logging;
pub mod slider;
pub mod status;
pub mod ui;
mod utils;

pub use error::{Error, Result};
