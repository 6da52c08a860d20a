//! Discount banner editor.
//!
//! Mirrors the admin form: load the banner, edit its fields, optionally stage
//! a new background image, submit. Submitting uploads the staged image first
//! and writes its URL into the banner before the banner itself is saved.
//!
//! The public page has its own fallback when the banner endpoint is down; see
//! [`public_banner`].

use chrono::{DateTime, Timelike, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::{BannerData, ImagePayload, SiteApi};
use crate::constants;
use crate::credentials::Credential;
use crate::error::Result;
use crate::status::StatusMessage;
use crate::utils::{LoadingFlag, bounded};

/// Shown after a successful submit.
pub const UPDATED_MESSAGE: &str = "Banner updated successfully!";

/// Admin-side banner form state.
pub struct BannerEditor {
    api: Arc<dyn SiteApi>,
    timeout: Duration,
    banner: BannerData,
    staged_image: Option<ImagePayload>,
    loading: bool,
    message: Option<StatusMessage>,
}

impl BannerEditor {
    pub fn new(api: Arc<dyn SiteApi>) -> Self {
        Self {
            api,
            timeout: Duration::from_secs(constants::DEFAULT_REQUEST_TIMEOUT_SECS),
            banner: BannerData::default(),
            staged_image: None,
            loading: false,
            message: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn banner(&self) -> &BannerData {
        &self.banner
    }

    /// Edit the form fields in place.
    pub fn banner_mut(&mut self) -> &mut BannerData {
        &mut self.banner
    }

    pub fn staged_image(&self) -> Option<&ImagePayload> {
        self.staged_image.as_ref()
    }

    /// Stage (or with `None`, unstage) a new background image.
    pub fn stage_image(&mut self, image: Option<ImagePayload>) {
        self.staged_image = image;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Fetch the current banner into the form.
    ///
    /// On failure the form keeps its current values.
    ///
    /// # Errors
    ///
    /// Returns the backend error or [`Error::Timeout`](crate::Error::Timeout).
    pub async fn load(&mut self) -> Result<()> {
        match bounded(self.timeout, "fetch banner", self.api.get_banner()).await {
            Ok(banner) => {
                self.banner = banner;
                Ok(())
            },
            Err(e) => {
                warn!(error = %e, "Failed to fetch banner data");
                Err(e)
            },
        }
    }

    /// Upload the staged image (if any), then save the banner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) for an incomplete form, otherwise the
    /// backend error of whichever request failed.
    pub async fn submit(&mut self, credential: &Credential) -> Result<()> {
        self.message = None;
        let result = {
            let _loading = LoadingFlag::raise(&mut self.loading);
            send(
                self.api.as_ref(),
                self.timeout,
                &mut self.banner,
                self.staged_image.as_ref(),
                credential,
            )
            .await
        };

        match result {
            Ok(()) => {
                info!(heading = %self.banner.heading, discount = self.banner.discount_percentage, "Banner updated");
                self.staged_image = None;
                self.message = Some(StatusMessage::success(UPDATED_MESSAGE));
                Ok(())
            },
            Err(e) => {
                warn!(error = %e, "Banner update failed");
                self.message = Some(StatusMessage::from(&e));
                Err(e)
            },
        }
    }
}

async fn send(
    api: &dyn SiteApi,
    timeout: Duration,
    banner: &mut BannerData,
    staged_image: Option<&ImagePayload>,
    credential: &Credential,
) -> Result<()> {
    banner.validate()?;

    if let Some(image) = staged_image {
        let url = bounded(
            timeout,
            "upload banner image",
            api.upload_banner_image(credential, image),
        )
        .await?;
        banner.image_url = url;
    }

    bounded(timeout, "update banner", api.update_banner(credential, banner)).await
}

/// Discount shown on the public page when the banner cannot be fetched:
/// 70% before noon Pakistan time, 50% from noon on.
pub fn default_discount(now: DateTime<Utc>) -> u8 {
    let pakistan = now + chrono::Duration::seconds(i64::from(constants::PKT_OFFSET_SECS));
    if pakistan.hour() < 12 {
        constants::MORNING_DISCOUNT
    } else {
        constants::AFTERNOON_DISCOUNT
    }
}

/// Banner the public page shows when `/api/banner` is unreachable.
pub fn fallback_banner(now: DateTime<Utc>) -> BannerData {
    BannerData {
        discount_percentage: default_discount(now),
        date: now.format("%Y-%m-%d").to_string(),
        heading: "Special Offer".to_string(),
        description: "Don't miss out on this amazing deal! Limited time offer on all products."
            .to_string(),
        image_url: "/assets/bg.jpg".to_string(),
    }
}

/// Banner for the public page: the stored one, or [`fallback_banner`].
pub async fn public_banner(api: &dyn SiteApi, timeout: Duration, now: DateTime<Utc>) -> BannerData {
    match bounded(timeout, "fetch banner", api.get_banner()).await {
        Ok(banner) => banner,
        Err(e) => {
            warn!(error = %e, "Failed to fetch banner data, using time-based default");
            fallback_banner(now)
        },
    }
}
