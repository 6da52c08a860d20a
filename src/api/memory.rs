//! In-memory backend.
//!
//! Behaves like the REST backend (ids, timestamps, stored image URLs, bearer
//! checks) without a network. Used by tests and embedders that want a
//! workflow without a server.
//! Failures and latency can be injected to exercise error paths.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::SiteApi;
use super::types::{BannerData, ImagePayload, ImageRecord, Settings};
use crate::credentials::Credential;
use crate::error::{Error, Result};

#[derive(Default)]
struct Inner {
    images: Mutex<Vec<ImageRecord>>,
    blobs: DashMap<String, Vec<u8>>,
    banner: Mutex<BannerData>,
    settings: Mutex<Settings>,
    accepted_token: Mutex<Option<String>>,
    pending_failure: Mutex<Option<(u16, String)>>,
    latency: Mutex<Option<Duration>>,
    requests: AtomicUsize,
    mutations: AtomicUsize,
}

/// In-memory [`SiteApi`] implementation.
///
/// `MemoryApi` is `Clone`; clones share the same store, so a test can keep a
/// handle for inspection while a workflow owns another.
///
/// # Example
///
/// ```
/// use promodesk::api::MemoryApi;
///
/// let api = MemoryApi::new().with_token("secret");
/// let handle = api.clone();
/// assert_eq!(handle.request_count(), 0);
/// assert!(handle.images().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct MemoryApi {
    inner: Arc<Inner>,
}

impl MemoryApi {
    /// Creates an empty backend that accepts any non-empty token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept this bearer token on mutating calls.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        *self.inner.accepted_token.lock() = Some(token.into());
        self
    }

    /// Replace the stored collection.
    #[must_use]
    pub fn with_images(self, images: Vec<ImageRecord>) -> Self {
        *self.inner.images.lock() = images;
        self
    }

    /// Replace the stored banner.
    #[must_use]
    pub fn with_banner(self, banner: BannerData) -> Self {
        *self.inner.banner.lock() = banner;
        self
    }

    /// Replace the stored settings.
    #[must_use]
    pub fn with_settings(self, settings: Settings) -> Self {
        *self.inner.settings.lock() = settings;
        self
    }

    /// Make the next request (of any kind) fail with this status and message.
    pub fn fail_next(&self, status: u16, message: impl Into<String>) {
        *self.inner.pending_failure.lock() = Some((status, message.into()));
    }

    /// Delay every request by `latency`; `None` removes the delay.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.inner.latency.lock() = latency;
    }

    /// Requests served so far, including failed ones.
    pub fn request_count(&self) -> usize {
        self.inner.requests.load(Ordering::SeqCst)
    }

    /// Mutating requests served so far, including rejected ones.
    pub fn mutation_count(&self) -> usize {
        self.inner.mutations.load(Ordering::SeqCst)
    }

    /// Current stored collection.
    pub fn images(&self) -> Vec<ImageRecord> {
        self.inner.images.lock().clone()
    }

    /// Current stored banner.
    pub fn banner(&self) -> BannerData {
        self.inner.banner.lock().clone()
    }

    /// Bytes stored behind an image URL.
    pub fn blob(&self, image_url: &str) -> Option<Vec<u8>> {
        self.inner.blobs.get(image_url).map(|b| b.value().clone())
    }

    async fn begin(&self, mutating: bool) -> Result<()> {
        self.inner.requests.fetch_add(1, Ordering::SeqCst);
        if mutating {
            self.inner.mutations.fetch_add(1, Ordering::SeqCst);
        }

        let latency = *self.inner.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some((status, message)) = self.inner.pending_failure.lock().take() {
            return Err(Error::http(status, message));
        }
        Ok(())
    }

    async fn begin_mutation(&self, credential: &Credential) -> Result<()> {
        self.begin(true).await?;
        if let Some(accepted) = self.inner.accepted_token.lock().as_deref()
            && accepted != credential.token()
        {
            return Err(Error::http(401, "Invalid token"));
        }
        Ok(())
    }

    fn store_blob(&self, folder: &str, image: &ImagePayload) -> String {
        let url = format!(
            "memory://{folder}/{}/{}",
            uuid::Uuid::new_v4(),
            image.file_name
        );
        self.inner.blobs.insert(url.clone(), image.bytes.clone());
        url
    }

    fn not_found(id: &str) -> Error {
        Error::http(404, format!("Image {id} not found"))
    }
}

#[async_trait]
impl SiteApi for MemoryApi {
    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        self.begin(false).await?;
        Ok(self.images())
    }

    async fn upload_image(
        &self,
        credential: &Credential,
        image: &ImagePayload,
        date: NaiveDate,
    ) -> Result<()> {
        self.begin_mutation(credential).await?;
        let record = ImageRecord {
            id: uuid::Uuid::new_v4().to_string(),
            image_url: self.store_blob("images", image),
            date,
            created_at: Utc::now(),
        };
        self.inner.images.lock().push(record);
        Ok(())
    }

    async fn delete_image(&self, credential: &Credential, id: &str) -> Result<()> {
        self.begin_mutation(credential).await?;
        let mut images = self.inner.images.lock();
        let index = images
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        let removed = images.remove(index);
        self.inner.blobs.remove(&removed.image_url);
        Ok(())
    }

    async fn update_image_date(
        &self,
        credential: &Credential,
        id: &str,
        date: NaiveDate,
    ) -> Result<()> {
        self.begin_mutation(credential).await?;
        let mut images = self.inner.images.lock();
        let record = images
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.date = date;
        Ok(())
    }

    async fn replace_image(
        &self,
        credential: &Credential,
        id: &str,
        image: &ImagePayload,
        date: NaiveDate,
    ) -> Result<()> {
        self.begin_mutation(credential).await?;
        if !self.inner.images.lock().iter().any(|r| r.id == id) {
            return Err(Self::not_found(id));
        }

        let url = self.store_blob("images", image);
        let mut images = self.inner.images.lock();
        let record = images
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        let old_url = std::mem::replace(&mut record.image_url, url);
        record.date = date;
        self.inner.blobs.remove(&old_url);
        Ok(())
    }

    async fn get_banner(&self) -> Result<BannerData> {
        self.begin(false).await?;
        Ok(self.banner())
    }

    async fn update_banner(&self, credential: &Credential, banner: &BannerData) -> Result<()> {
        self.begin_mutation(credential).await?;
        *self.inner.banner.lock() = banner.clone();
        Ok(())
    }

    async fn upload_banner_image(
        &self,
        credential: &Credential,
        image: &ImagePayload,
    ) -> Result<String> {
        self.begin_mutation(credential).await?;
        Ok(self.store_blob("banner", image))
    }

    async fn get_settings(&self) -> Result<Settings> {
        self.begin(false).await?;
        Ok(self.inner.settings.lock().clone())
    }
}
