use tokio::task::JoinHandle;

use crate::error::SyncError;

/// Handle to a scheduled durable write.
///
/// Dropping the handle detaches the write; awaiting [`SyncHandle::wait`]
/// reports its outcome. Either way the in-memory state is already updated.
#[derive(Debug)]
pub struct SyncHandle {
    inner: JoinHandle<Result<(), SyncError>>,
}

impl SyncHandle {
    pub(crate) fn new(inner: JoinHandle<Result<(), SyncError>>) -> Self {
        Self { inner }
    }

    /// Wait for the durable write to finish.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the store rejected the write or the task was
    /// aborted.
    pub async fn wait(self) -> Result<(), SyncError> {
        match self.inner.await {
            Ok(result) => result,
            Err(join) => Err(SyncError::TaskFailed(join.to_string())),
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}
