//! Single-slot edit session.
//!
//! The session is one tagged value, so "a date edit" and "an image
//! replacement" can never both be pending for the same record. Staging a
//! replacement image moves `DateOnly` to `Replace`; clearing it moves back.

use chrono::NaiveDate;

use crate::api::{ImagePayload, ImageRecord};
use crate::error::{Error, Result};

/// What the open edit session will do when committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditIntent {
    /// No session open.
    #[default]
    None,
    /// Only the date of `record` changes.
    DateOnly { record: ImageRecord, date: NaiveDate },
    /// Image and date of `record` are replaced together.
    Replace {
        record: ImageRecord,
        date: NaiveDate,
        binary: ImagePayload,
    },
}

/// Request a commit sends, detached from the session so the session lock is
/// not held across the network call.
#[derive(Debug, Clone)]
pub(crate) enum PendingCommit {
    DateOnly {
        id: String,
        date: NaiveDate,
    },
    Replace {
        id: String,
        date: NaiveDate,
        binary: ImagePayload,
    },
}

impl PendingCommit {
    pub(crate) fn id(&self) -> &str {
        match self {
            Self::DateOnly { id, .. } | Self::Replace { id, .. } => id,
        }
    }
}

impl EditIntent {
    /// Open a date-only session seeded with the record's current date.
    pub fn begin(record: ImageRecord) -> Self {
        Self::DateOnly {
            date: record.date,
            record,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Record under edit.
    pub fn record(&self) -> Option<&ImageRecord> {
        match self {
            Self::None => None,
            Self::DateOnly { record, .. } | Self::Replace { record, .. } => Some(record),
        }
    }

    /// Working date of the session.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::None => None,
            Self::DateOnly { date, .. } | Self::Replace { date, .. } => Some(*date),
        }
    }

    /// Staged replacement image.
    pub fn binary(&self) -> Option<&ImagePayload> {
        match self {
            Self::Replace { binary, .. } => Some(binary),
            _ => None,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::None => "closed",
            Self::DateOnly { .. } => "updating the date only",
            Self::Replace { .. } => "replacing the image",
        }
    }

    /// Change the working date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEditSession`] when no session is open.
    pub fn set_date(&mut self, new_date: NaiveDate) -> Result<()> {
        match self {
            Self::None => Err(Error::NoEditSession),
            Self::DateOnly { date, .. } | Self::Replace { date, .. } => {
                *date = new_date;
                Ok(())
            },
        }
    }

    /// Stage (or swap) a replacement image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEditSession`] when no session is open.
    pub fn stage_replacement(&mut self, new_binary: ImagePayload) -> Result<()> {
        *self = match std::mem::take(self) {
            Self::None => return Err(Error::NoEditSession),
            Self::DateOnly { record, date } | Self::Replace { record, date, .. } => {
                Self::Replace {
                    record,
                    date,
                    binary: new_binary,
                }
            },
        };
        Ok(())
    }

    /// Drop the staged image, keeping the working date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEditSession`] when no session is open.
    pub fn clear_replacement(&mut self) -> Result<()> {
        *self = match std::mem::take(self) {
            Self::None => return Err(Error::NoEditSession),
            Self::DateOnly { record, date } | Self::Replace { record, date, .. } => {
                Self::DateOnly { record, date }
            },
        };
        Ok(())
    }

    pub(crate) fn pending(&self) -> Option<PendingCommit> {
        match self {
            Self::None => None,
            Self::DateOnly { record, date } => Some(PendingCommit::DateOnly {
                id: record.id.clone(),
                date: *date,
            }),
            Self::Replace {
                record,
                date,
                binary,
            } => Some(PendingCommit::Replace {
                id: record.id.clone(),
                date: *date,
                binary: binary.clone(),
            }),
        }
    }
}
