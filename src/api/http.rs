//! REST backend over reqwest.

use async_trait::async_trait;
use chrono::NaiveDate;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::SiteApi;
use super::types::{
    BannerData, DateUpdate, ErrorBody, ImagePayload, ImageRecord, Settings, UploadedImage,
};
use crate::config::ApiConfig;
use crate::credentials::Credential;
use crate::error::{Error, Result};

/// Characters left unescaped in a path segment (same set as `encodeURIComponent`).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Client for the backend REST API.
///
/// Every request is bounded by the configured timeout; an expired request
/// becomes [`Error::Timeout`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpApi {
    /// Build a client from validated API settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("promodesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Base URL requests are resolved against (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn image_url(&self, id: &str, suffix: &str) -> String {
        let id = utf8_percent_encode(id, SEGMENT);
        format!("{}/api/images/{id}{suffix}", self.base_url)
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| self.request_error(operation, e))
    }

    /// Decode a JSON body. The client timeout also covers the body read.
    async fn read_json<T: DeserializeOwned>(&self, operation: &str, response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| self.request_error(operation, e))
    }

    fn request_error(&self, operation: &str, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::timeout(operation, self.timeout.as_secs())
        } else {
            Error::from(err)
        }
    }
}

/// Map a non-success response to [`Error::Http`].
///
/// Upload endpoints pass `read_message` so a JSON `{ "message": .. }` body
/// replaces the fallback text; other endpoints always use the fallback.
async fn expect_success(response: Response, fallback: &str, read_message: bool) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = if read_message {
        response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty())
    } else {
        None
    };

    Err(Error::http(
        status.as_u16(),
        message.unwrap_or_else(|| fallback.to_string()),
    ))
}

fn image_part(image: &ImagePayload) -> Result<Part> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|e| Error::validation(format!("invalid content type '{}': {e}", image.content_type)))
}

fn image_form(image: &ImagePayload, date: Option<NaiveDate>) -> Result<Form> {
    let form = Form::new().part("image", image_part(image)?);
    Ok(match date {
        Some(date) => form.text("date", date.format("%Y-%m-%d").to_string()),
        None => form,
    })
}

#[async_trait]
impl SiteApi for HttpApi {
    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        debug!(url = %self.url("/api/images"), "GET images");
        let response = self
            .send("list images", self.client.get(self.url("/api/images")))
            .await?;
        let response = expect_success(response, "Failed to fetch images", false).await?;
        self.read_json("list images", response).await
    }

    async fn upload_image(
        &self,
        credential: &Credential,
        image: &ImagePayload,
        date: NaiveDate,
    ) -> Result<()> {
        debug!(file = %image.file_name, %date, "POST image upload");
        let request = self
            .client
            .post(self.url("/api/images/upload"))
            .bearer_auth(credential.token())
            .multipart(image_form(image, Some(date))?);
        let response = self.send("upload image", request).await?;
        expect_success(response, "Upload failed", true).await?;
        Ok(())
    }

    async fn delete_image(&self, credential: &Credential, id: &str) -> Result<()> {
        debug!(%id, "DELETE image");
        let request = self
            .client
            .delete(self.image_url(id, ""))
            .bearer_auth(credential.token());
        let response = self.send("delete image", request).await?;
        expect_success(response, "Delete failed", false).await?;
        Ok(())
    }

    async fn update_image_date(
        &self,
        credential: &Credential,
        id: &str,
        date: NaiveDate,
    ) -> Result<()> {
        debug!(%id, %date, "PUT image date");
        let request = self
            .client
            .put(self.image_url(id, "/update-date"))
            .bearer_auth(credential.token())
            .json(&DateUpdate { date });
        let response = self.send("update image date", request).await?;
        expect_success(response, "Failed to update date", false).await?;
        Ok(())
    }

    async fn replace_image(
        &self,
        credential: &Credential,
        id: &str,
        image: &ImagePayload,
        date: NaiveDate,
    ) -> Result<()> {
        debug!(%id, file = %image.file_name, %date, "PUT image replace");
        let request = self
            .client
            .put(self.image_url(id, "/replace"))
            .bearer_auth(credential.token())
            .multipart(image_form(image, Some(date))?);
        let response = self.send("replace image", request).await?;
        expect_success(response, "Failed to replace image", true).await?;
        Ok(())
    }

    async fn get_banner(&self) -> Result<BannerData> {
        let response = self
            .send("fetch banner", self.client.get(self.url("/api/banner")))
            .await?;
        let response = expect_success(response, "Failed to fetch banner", false).await?;
        self.read_json("fetch banner", response).await
    }

    async fn update_banner(&self, credential: &Credential, banner: &BannerData) -> Result<()> {
        debug!(heading = %banner.heading, "PUT banner");
        let request = self
            .client
            .put(self.url("/api/banner"))
            .bearer_auth(credential.token())
            .json(banner);
        let response = self.send("update banner", request).await?;
        expect_success(response, "Update failed", false).await?;
        Ok(())
    }

    async fn upload_banner_image(
        &self,
        credential: &Credential,
        image: &ImagePayload,
    ) -> Result<String> {
        debug!(file = %image.file_name, "POST banner image");
        let request = self
            .client
            .post(self.url("/api/banner/upload"))
            .bearer_auth(credential.token())
            .multipart(image_form(image, None)?);
        let response = self.send("upload banner image", request).await?;
        let response = expect_success(response, "Image upload failed", true).await?;
        let uploaded: UploadedImage = self.read_json("upload banner image", response).await?;
        Ok(uploaded.image_url)
    }

    async fn get_settings(&self) -> Result<Settings> {
        let response = self
            .send("fetch settings", self.client.get(self.url("/api/settings")))
            .await?;
        let response = expect_success(response, "Failed to fetch settings", false).await?;
        self.read_json("fetch settings", response).await
    }
}
