//! Wire types for the backend REST surface.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants;
use crate::error::{Error, Result};

/// One dated image stored by the backend.
///
/// `id` and `created_at` are assigned by the backend and never change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    pub image_url: String,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Discount banner shown on the public page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BannerData {
    pub discount_percentage: u8,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

impl Default for BannerData {
    fn default() -> Self {
        Self {
            discount_percentage: 25,
            date: String::new(),
            heading: String::new(),
            description: String::new(),
            image_url: String::new(),
        }
    }
}

impl BannerData {
    /// Check the fields the admin form requires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming every missing or out-of-range field.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.discount_percentage > 100 {
            errors.push(format!(
                "discount must be between 0 and 100 (got {})",
                self.discount_percentage
            ));
        }
        if self.heading.trim().is_empty() {
            errors.push("heading is required".to_string());
        }
        if self.date.trim().is_empty() {
            errors.push("date is required".to_string());
        }
        if self.description.trim().is_empty() {
            errors.push("description is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(errors.join("; ")))
        }
    }
}

/// Header texts displayed above the public slider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub header_text: String,
    pub subheader_text: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            header_text: constants::DEFAULT_HEADER_TEXT.to_string(),
            subheader_text: constants::DEFAULT_SUBHEADER_TEXT.to_string(),
        }
    }
}

/// Image bytes ready to be sent as a multipart file part.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImagePayload {
    /// Build a payload, guessing the MIME type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read a payload from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Validation`] if it is empty.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(format!("reading {}", path.display()), e))?;

        if bytes.is_empty() {
            return Err(Error::validation(format!(
                "{} is empty",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self::new(file_name, bytes))
    }
}

/// Body returned by `POST /api/banner/upload`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadedImage {
    pub image_url: String,
}

/// Best-effort error body; only `message` is read.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DateUpdate {
    pub date: NaiveDate,
}

/// `date` fields may arrive as `2024-01-01` or as a full RFC 3339 timestamp.
mod iso_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
    }
}
