//! Stand-in for the remote mail service.
//!
//! Completes messages and downloads attachments after a delay, reporting
//! progress the way a real sync service would.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use mailview_core::{
    AttachmentId, ContentStore, FetchListener, FetchProgress, ListenerId, MeetingResponse,
    MessageId, RemoteFetcher, SqliteContentStore,
};
use tokio::task::AbortHandle;

type Listeners = Mutex<Vec<(ListenerId, Arc<dyn FetchListener>)>>;

/// Fetcher that pretends to talk to a server.
pub struct SimulatedFetcher {
    store: Arc<SqliteContentStore>,
    cache_dir: PathBuf,
    delay: Duration,
    listeners: Arc<Listeners>,
    next_listener: AtomicU64,
    downloads: Arc<Mutex<HashMap<AttachmentId, AbortHandle>>>,
}

impl SimulatedFetcher {
    /// Creates a fetcher writing downloaded attachments into `cache_dir`.
    pub fn new(store: Arc<SqliteContentStore>, cache_dir: PathBuf, delay: Duration) -> Self {
        Self {
            store,
            cache_dir,
            delay,
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener: AtomicU64::new(1),
            downloads: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

fn snapshot(listeners: &Listeners) -> Vec<Arc<dyn FetchListener>> {
    listeners
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|(_, l)| Arc::clone(l))
        .collect()
}

fn notify_message(listeners: &Listeners, id: MessageId, progress: &FetchProgress) {
    for listener in snapshot(listeners) {
        listener.load_message_progress(id, progress.clone());
    }
}

fn notify_attachment(
    listeners: &Listeners,
    owner: MessageId,
    id: AttachmentId,
    progress: &FetchProgress,
) {
    for listener in snapshot(listeners) {
        listener.load_attachment_progress(owner, id, progress.clone());
    }
}

impl RemoteFetcher for SimulatedFetcher {
    fn add_listener(&self, listener: Arc<dyn FetchListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(l, _)| *l != id);
    }

    fn request_full_load(&self, message_id: MessageId) {
        let store = Arc::clone(&self.store);
        let listeners = Arc::clone(&self.listeners);
        let delay = self.delay;

        tokio::spawn(async move {
            notify_message(&listeners, message_id, &FetchProgress::Progress(0));
            tokio::time::sleep(delay / 2).await;
            notify_message(&listeners, message_id, &FetchProgress::Progress(50));
            tokio::time::sleep(delay / 2).await;

            let progress = match store.mark_complete(message_id).await {
                Ok(()) => {
                    tracing::info!("Simulated full load of {} finished", message_id);
                    FetchProgress::Progress(100)
                }
                Err(e) => FetchProgress::Error(e.to_string()),
            };
            notify_message(&listeners, message_id, &progress);
        });
    }

    fn request_attachment(&self, attachment_id: AttachmentId, owner: MessageId) {
        let store = Arc::clone(&self.store);
        let listeners = Arc::clone(&self.listeners);
        let downloads = Arc::clone(&self.downloads);
        let cache_dir = self.cache_dir.clone();
        let delay = self.delay;

        let task = tokio::spawn(async move {
            notify_attachment(&listeners, owner, attachment_id, &FetchProgress::Progress(0));
            tokio::time::sleep(delay).await;

            let progress = match download(&store, &cache_dir, attachment_id).await {
                Ok(()) => FetchProgress::Progress(100),
                Err(e) => FetchProgress::Error(e.to_string()),
            };
            downloads
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&attachment_id);
            notify_attachment(&listeners, owner, attachment_id, &progress);
        });

        self.downloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(attachment_id, task.abort_handle());
    }

    fn cancel_attachment(&self, attachment_id: AttachmentId) {
        let handle = self
            .downloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&attachment_id);
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!("Cancelled download of attachment {}", attachment_id);
        }
    }

    fn send_meeting_response(&self, message_id: MessageId, response: MeetingResponse) {
        tracing::info!("Simulated reply {} to invitation {}", response, message_id);
    }
}

/// Writes placeholder content for the attachment and records its location.
async fn download(
    store: &SqliteContentStore,
    cache_dir: &std::path::Path,
    id: AttachmentId,
) -> mailview_core::Result<()> {
    let attachment = store
        .load_attachment(id)
        .await?
        .ok_or_else(|| mailview_core::Error::NotFound(format!("attachment {id}")))?;

    tokio::fs::create_dir_all(cache_dir).await?;
    let path = cache_dir.join(format!("{}-{}", id, attachment.name));
    tokio::fs::write(&path, format!("Simulated content of {}\n", attachment.name)).await?;
    store
        .set_content_location(id, &format!("file://{}", path.display()))
        .await
}
