//! Image gallery manager.
//!
//! Keeps a local view of the backend's dated image collection and applies
//! the admin's edits to it. The local collection is never patched: every
//! successful mutation is followed by a full re-fetch, and each fetch result
//! replaces the collection wholesale (last response to arrive wins).
//!
//! At most one edit session is open at a time ([`EditIntent`]). Mutations on
//! the same record id run one after another; a second upload while one is in
//! flight is rejected with [`Error::Busy`]. Every backend call is bounded by
//! a timeout, and the loading/submitting flags are released on every exit
//! path, including cancellation.
//!
//! # Example
//!
//! ```ignore
//! let gallery = GalleryManager::new(Arc::new(api));
//! gallery.list().await?;
//! gallery.begin_edit_by_id("a")?;
//! gallery.set_edit_date(NaiveDate::from_ymd_opt(2024, 2, 2).unwrap())?;
//! gallery.commit(&credential).await?;
//! ```

mod locks;
mod session;


pub use locks::{InFlight, InFlightGuard, RecordGuard, RecordLocks};
pub use session::EditIntent;

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{ImagePayload, ImageRecord, SiteApi};
use crate::constants;
use crate::credentials::Credential;
use crate::error::{Error, Result};
use crate::status::StatusMessage;
use crate::utils;
use session::PendingCommit;

/// Shown when upload is attempted with no image selected.
pub const SELECT_IMAGE_MESSAGE: &str = "Please select an image";

/// Question asked before a delete is sent.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this image?";

/// Blocking yes/no decision taken before a destructive call.
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Default)]
struct GalleryState {
    images: Vec<ImageRecord>,
    lists_in_flight: usize,
    mutations_in_flight: usize,
    message: Option<StatusMessage>,
    intent: EditIntent,
}

#[derive(Clone, Copy)]
enum Flag {
    Loading,
    Submitting,
}

/// Raises a flag for its lifetime.
struct FlagGuard<'a> {
    state: &'a Mutex<GalleryState>,
    flag: Flag,
}

impl<'a> FlagGuard<'a> {
    fn raise(state: &'a Mutex<GalleryState>, flag: Flag) -> Self {
        let mut s = state.lock();
        match flag {
            Flag::Loading => s.lists_in_flight += 1,
            Flag::Submitting => s.mutations_in_flight += 1,
        }
        Self { state, flag }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        let mut s = self.state.lock();
        match self.flag {
            Flag::Loading => s.lists_in_flight = s.lists_in_flight.saturating_sub(1),
            Flag::Submitting => s.mutations_in_flight = s.mutations_in_flight.saturating_sub(1),
        }
    }
}

/// Which commit path the caller asked for.
#[derive(Clone, Copy, PartialEq, Eq)]
enum CommitKind {
    DateOnly,
    Replace,
    Any,
}

/// Controller for the dated image collection.
///
/// All methods take `&self`; share one manager between tasks with an `Arc`.
pub struct GalleryManager {
    api: Arc<dyn SiteApi>,
    timeout: Duration,
    default_upload_date: NaiveDate,
    state: Mutex<GalleryState>,
    record_locks: RecordLocks,
    upload_slot: InFlight,
}

impl GalleryManager {
    /// Create a manager with an empty collection and the default timeout.
    ///
    /// The default upload date is today's local date.
    pub fn new(api: Arc<dyn SiteApi>) -> Self {
        Self {
            api,
            timeout: Duration::from_secs(constants::DEFAULT_REQUEST_TIMEOUT_SECS),
            default_upload_date: chrono::Local::now().date_naive(),
            state: Mutex::new(GalleryState::default()),
            record_locks: RecordLocks::new(),
            upload_slot: InFlight::new(),
        }
    }

    /// Bound every backend call by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the date pre-filled for uploads.
    #[must_use]
    pub fn with_default_upload_date(mut self, date: NaiveDate) -> Self {
        self.default_upload_date = date;
        self
    }

    pub fn default_upload_date(&self) -> NaiveDate {
        self.default_upload_date
    }

    /// Last fetched collection, in backend order.
    pub fn images(&self) -> Vec<ImageRecord> {
        self.state.lock().images.clone()
    }

    /// True while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.lock().lists_in_flight > 0
    }

    /// True while a mutation is in flight.
    pub fn is_submitting(&self) -> bool {
        self.state.lock().mutations_in_flight > 0
    }

    /// Outcome of the last user action, if any.
    pub fn message(&self) -> Option<StatusMessage> {
        self.state.lock().message.clone()
    }

    /// Current edit session.
    pub fn edit_intent(&self) -> EditIntent {
        self.state.lock().intent.clone()
    }

    // ------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------

    /// Fetch the full collection and replace the local one with it.
    ///
    /// On failure the previous collection is kept (empty before the first
    /// successful fetch) and no status message is set; the error is logged
    /// and returned.
    ///
    /// # Errors
    ///
    /// Returns the backend error or [`Error::Timeout`].
    pub async fn list(&self) -> Result<()> {
        let _loading = FlagGuard::raise(&self.state, Flag::Loading);
        match self.bounded("list images", self.api.list_images()).await {
            Ok(images) => {
                debug!(count = images.len(), "Fetched images");
                self.state.lock().images = images;
                Ok(())
            },
            Err(e) => {
                warn!(error = %e, "Failed to fetch images, keeping last snapshot");
                Err(e)
            },
        }
    }

    /// Upload a new image with its date, then refresh.
    ///
    /// `binary` is `None` when the operator has not picked a file; that is
    /// rejected with [`SELECT_IMAGE_MESSAGE`] before any network call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without a file, [`Error::Busy`] if
    /// another upload is in flight, or the backend error.
    pub async fn upload(
        &self,
        credential: &Credential,
        binary: Option<ImagePayload>,
        date: NaiveDate,
    ) -> Result<()> {
        self.clear_message();
        let Some(binary) = binary else {
            return Err(self.fail(Error::validation(SELECT_IMAGE_MESSAGE)));
        };
        let slot = self
            .upload_slot
            .try_claim("image upload")
            .map_err(|e| self.fail(e))?;

        let result = {
            let _submitting = FlagGuard::raise(&self.state, Flag::Submitting);
            self.bounded(
                "upload image",
                self.api.upload_image(credential, &binary, date),
            )
            .await
        };
        drop(slot);

        if result.is_ok() {
            info!(file = %binary.file_name, %date, "Image uploaded");
        }
        self.settle(result, "Image uploaded successfully!").await
    }

    /// Delete a record after the operator confirms, then refresh.
    ///
    /// Returns `Ok(false)` when the operator declines; nothing is sent then.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn delete(
        &self,
        credential: &Credential,
        id: &str,
        confirm: &dyn Confirm,
    ) -> Result<bool> {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(%id, "Delete declined");
            return Ok(false);
        }
        self.clear_message();

        let result = {
            let _record = self.record_locks.lock(id).await;
            let _submitting = FlagGuard::raise(&self.state, Flag::Submitting);
            self.bounded("delete image", self.api.delete_image(credential, id))
                .await
        };

        if result.is_ok() {
            info!(%id, "Image deleted");
        }
        self.settle(result, "Image deleted successfully!")
            .await
            .map(|()| true)
    }

    // ------------------------------------------------------------------
    // Edit session
    // ------------------------------------------------------------------

    /// Open an edit session on `record`, discarding any open one.
    pub fn begin_edit(&self, record: ImageRecord) {
        let mut state = self.state.lock();
        if let Some(previous) = state.intent.record() {
            debug!(previous = %previous.id, next = %record.id, "Discarding open edit session");
        }
        state.intent = EditIntent::begin(record);
    }

    /// Open an edit session on a record of the last fetched collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `id` is not in the collection.
    pub fn begin_edit_by_id(&self, id: &str) -> Result<()> {
        let record = self
            .state
            .lock()
            .images
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("No image with id '{id}'")))?;
        self.begin_edit(record);
        Ok(())
    }

    /// Change the working date of the open session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEditSession`] when no session is open.
    pub fn set_edit_date(&self, date: NaiveDate) -> Result<()> {
        self.state.lock().intent.set_date(date)
    }

    /// Stage a replacement image in the open session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEditSession`] when no session is open.
    pub fn stage_replacement(&self, binary: ImagePayload) -> Result<()> {
        self.state.lock().intent.stage_replacement(binary)
    }

    /// Drop the staged replacement image, keeping the working date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEditSession`] when no session is open.
    pub fn clear_replacement(&self) -> Result<()> {
        self.state.lock().intent.clear_replacement()
    }

    /// Close the session and discard its edits. Returns `true` if one was open.
    pub fn cancel_edit(&self) -> bool {
        let previous = std::mem::take(&mut self.state.lock().intent);
        previous.is_open()
    }

    /// Send the session's date for its record, then close it and refresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEditSession`], [`Error::WrongEditIntent`] when a
    /// replacement image is staged, or the backend error. On a backend error
    /// the session stays open.
    pub async fn commit_date_only(&self, credential: &Credential) -> Result<()> {
        let pending = self.take_pending(CommitKind::DateOnly)?;
        self.run_commit(credential, pending).await
    }

    /// Send the staged image and the date in one request, then close the
    /// session and refresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEditSession`], [`Error::WrongEditIntent`] when no
    /// image is staged, or the backend error. On a backend error the session
    /// stays open so the commit can be retried as-is.
    pub async fn commit_replace(&self, credential: &Credential) -> Result<()> {
        let pending = self.take_pending(CommitKind::Replace)?;
        self.run_commit(credential, pending).await
    }

    /// Commit the open session along whichever path its intent selects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEditSession`] or the backend error.
    pub async fn commit(&self, credential: &Credential) -> Result<()> {
        let pending = self.take_pending(CommitKind::Any)?;
        self.run_commit(credential, pending).await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn take_pending(&self, kind: CommitKind) -> Result<PendingCommit> {
        let result = {
            let state = self.state.lock();
            let intent = &state.intent;
            match (kind, intent) {
                (_, EditIntent::None) => Err(Error::NoEditSession),
                (CommitKind::DateOnly, EditIntent::Replace { .. }) => Err(Error::WrongEditIntent {
                    attempted: "update the date only",
                    actual: intent.describe(),
                }),
                (CommitKind::Replace, EditIntent::DateOnly { .. }) => Err(Error::WrongEditIntent {
                    attempted: "replace the image",
                    actual: intent.describe(),
                }),
                _ => intent.pending().ok_or(Error::NoEditSession),
            }
        };
        result.map_err(|e| self.fail(e))
    }

    async fn run_commit(&self, credential: &Credential, pending: PendingCommit) -> Result<()> {
        self.clear_message();
        let id = pending.id().to_string();

        let result = {
            let _record = self.record_locks.lock(&id).await;
            let _submitting = FlagGuard::raise(&self.state, Flag::Submitting);
            match &pending {
                PendingCommit::DateOnly { id, date } => {
                    self.bounded(
                        "update image date",
                        self.api.update_image_date(credential, id, *date),
                    )
                    .await
                },
                PendingCommit::Replace { id, date, binary } => {
                    self.bounded(
                        "replace image",
                        self.api.replace_image(credential, id, binary, *date),
                    )
                    .await
                },
            }
        };

        let success = match pending {
            PendingCommit::DateOnly { date, .. } => {
                if result.is_ok() {
                    info!(%id, %date, "Image date updated");
                }
                "Date updated successfully!"
            },
            PendingCommit::Replace { date, .. } => {
                if result.is_ok() {
                    info!(%id, %date, "Image replaced");
                }
                "Image replaced successfully!"
            },
        };

        if result.is_ok() {
            self.close_session_for(&id);
        }
        self.settle(result, success).await
    }

    /// Close the session if it still targets `id`; a session opened on
    /// another record while the commit was in flight is left alone.
    fn close_session_for(&self, id: &str) {
        let mut state = self.state.lock();
        if state.intent.record().is_some_and(|r| r.id == id) {
            state.intent = EditIntent::None;
        }
    }

    /// Record the outcome of a mutation; refresh after a success.
    async fn settle(&self, result: Result<()>, success: &str) -> Result<()> {
        match result {
            Ok(()) => {
                self.state.lock().message = Some(StatusMessage::success(success));
                // Refresh failures keep the old snapshot and are already logged.
                let _ = self.list().await;
                Ok(())
            },
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&self, err: Error) -> Error {
        warn!(error = %err, "Gallery action failed");
        self.state.lock().message = Some(StatusMessage::from(&err));
        err
    }

    fn clear_message(&self) {
        self.state.lock().message = None;
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        utils::bounded(self.timeout, operation, call).await
    }
}
