//! Typed client for the promo site backend.
//!
//! [`SiteApi`] is the seam every workflow talks through. Two backends ship:
//!
//! - [`HttpApi`] - the real REST client (reqwest)
//! - [`MemoryApi`] - in-process backend for tests and offline demos
//!
//! Read endpoints are public. Mutating endpoints take a [`Credential`],
//! sent as a bearer token.

mod http;
mod memory;
mod types;

pub use http::HttpApi;
pub use memory::MemoryApi;
pub use types::{BannerData, ImagePayload, ImageRecord, Settings};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::credentials::Credential;
use crate::error::Result;

/// Backend REST surface consumed by promodesk.
///
/// Implementations must be thread-safe (`Send + Sync`) so one instance can be
/// shared by every workflow through an `Arc`.
#[async_trait]
pub trait SiteApi: Send + Sync + 'static {
    /// `GET /api/images` - every record, in backend order.
    async fn list_images(&self) -> Result<Vec<ImageRecord>>;

    /// `POST /api/images/upload` - multipart `image` + `date`.
    async fn upload_image(
        &self,
        credential: &Credential,
        image: &ImagePayload,
        date: NaiveDate,
    ) -> Result<()>;

    /// `DELETE /api/images/{id}` with the id percent-encoded.
    async fn delete_image(&self, credential: &Credential, id: &str) -> Result<()>;

    /// `PUT /api/images/{id}/update-date` - JSON `{ "date": .. }`.
    async fn update_image_date(
        &self,
        credential: &Credential,
        id: &str,
        date: NaiveDate,
    ) -> Result<()>;

    /// `PUT /api/images/{id}/replace` - multipart `image` + `date` in one request.
    async fn replace_image(
        &self,
        credential: &Credential,
        id: &str,
        image: &ImagePayload,
        date: NaiveDate,
    ) -> Result<()>;

    /// `GET /api/banner`.
    async fn get_banner(&self) -> Result<BannerData>;

    /// `PUT /api/banner` - full banner as JSON.
    async fn update_banner(&self, credential: &Credential, banner: &BannerData) -> Result<()>;

    /// `POST /api/banner/upload` - multipart `image`; returns the stored image URL.
    async fn upload_banner_image(
        &self,
        credential: &Credential,
        image: &ImagePayload,
    ) -> Result<String>;

    /// `GET /api/settings`.
    async fn get_settings(&self) -> Result<Settings>;
}
