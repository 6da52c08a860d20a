//! Shared utility functions.

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Run `call` under `timeout`; expiry becomes [`Error::Timeout`] naming `operation`.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    operation: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(operation, timeout.as_secs())),
    }
}

/// Sets a loading flag for its lifetime and clears it on drop, including when
/// the owning future is cancelled.
pub(crate) struct LoadingFlag<'a> {
    flag: &'a mut bool,
}

impl<'a> LoadingFlag<'a> {
    pub(crate) fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}
