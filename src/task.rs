//! Asynchronous take helper.
//!
//! `atake` spawns a background task that performs the blocking take
//! and hands a message back to the originator once the tokens are
//! admitted. The handle is linked to the originator: dropping it
//! aborts the helper, and the helper's exit is observable through
//! `is_finished`.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::engine::Flow;
use crate::error::{Error, Result};

/// Handle to a background take.
///
/// Await the message with [`TakeTask::recv`]; drop the handle to
/// abort the helper. A helper parked at the waiter gate has already
/// refunded its probe, so aborting it never leaks tokens.
pub struct TakeTask<T> {
    handle: Option<JoinHandle<()>>,
    rx: oneshot::Receiver<T>,
}

impl<T: Send + 'static> TakeTask<T> {
    /// Spawn the helper on the given runtime.
    pub(crate) fn spawn(runtime: &Handle, flow: Arc<Flow>, n: u64, msg: T) -> Self {
        let (tx, rx) = oneshot::channel();
        let handle = runtime.spawn(async move {
            flow.take(n).await;
            let _ = tx.send(msg);
        });
        Self {
            handle: Some(handle),
            rx,
        }
    }

    /// Check whether the helper task has exited.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Abort the helper without waiting for admission.
    pub fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    /// Wait for the helper to finish its take and deliver the message.
    ///
    /// Returns the helper's exit as well: after `recv` resolves, the
    /// task is gone.
    pub async fn recv(mut self) -> Result<T> {
        let msg = (&mut self.rx).await.map_err(|_| Error::TaskAborted)?;
        if let Some(handle) = self.handle.take() {
            // The message was sent, so the task is on its way out;
            // join it for a clean exit.
            let _ = handle.await;
        }
        Ok(msg)
    }
}

impl<T> Drop for TakeTask<T> {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}
