//! Background task plumbing for the load stages.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use super::input::Input;
use crate::token::{FocusFence, FocusToken};
use crate::traits::ContentStore;

/// Abort handles of the in-flight stage loads.
#[derive(Debug, Default)]
pub(crate) struct StageTasks {
    pub(crate) metadata: Option<AbortHandle>,
    pub(crate) body: Option<AbortHandle>,
    pub(crate) attachments: Option<AbortHandle>,
}

impl StageTasks {
    /// Best-effort abort of every outstanding stage load.
    pub(crate) fn abort_all(&mut self) {
        for handle in [
            self.metadata.take(),
            self.body.take(),
            self.attachments.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

/// Runs `load` in the background and sends its result back as an [`Input`].
///
/// The task gives up without reporting once `token` is superseded, checked
/// both before and after the load. The coordinator repeats the check when the
/// input arrives, so this only saves work.
pub(crate) fn spawn_fenced<T, Fut, F>(
    fence: &FocusFence,
    token: FocusToken,
    inputs: &UnboundedSender<Input>,
    load: Fut,
    into_input: F,
) -> AbortHandle
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    F: FnOnce(T) -> Input + Send + 'static,
{
    let fence = fence.clone();
    let inputs = inputs.clone();
    tokio::spawn(async move {
        if !fence.is_live(token) {
            return;
        }
        let value = load.await;
        if !fence.is_live(token) {
            tracing::debug!(%token, "Discarding load result for superseded focus");
            return;
        }
        if inputs.send(into_input(value)).is_err() {
            tracing::trace!(%token, "Coordinator stopped before load result arrived");
        }
    })
    .abort_handle()
}

/// Fire-and-forget state update against the store.
pub(crate) fn spawn_write<Fut, F>(store: &Arc<dyn ContentStore>, what: &'static str, write: F)
where
    Fut: Future<Output = crate::Result<()>> + Send + 'static,
    F: FnOnce(Arc<dyn ContentStore>) -> Fut,
{
    let fut = write(Arc::clone(store));
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            tracing::warn!("Failed to {}: {}", what, e);
        }
    });
}
