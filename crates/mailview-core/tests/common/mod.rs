//! Shared fixtures for the pipeline tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mailview_core::{
    AccountId, AttachmentDescriptor, AttachmentId, AttachmentSink, BodyContent, Collaborators,
    ContentStore, Error, FetchListener, FetchProgress, ListenerId, LoadCompleteness,
    LoadCoordinator, MailboxId, MeetingResponse, MessageId, MessageOrder, MessageRecord, RemoteFetcher, Result,
    ViewEvent, ViewerSettings,
};
use tokio::sync::mpsc::UnboundedReceiver;

/// A store call, recorded in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Message(MessageId),
    Body(MessageId),
    Attachments(MessageId),
    Attachment(AttachmentId),
    SetRead(MessageId, bool),
    SetFavorite(MessageId, bool),
    Delete(MessageId),
}

#[derive(Default)]
pub struct MockStore {
    messages: Mutex<HashMap<MessageId, MessageRecord>>,
    bodies: Mutex<HashMap<MessageId, BodyContent>>,
    attachments: Mutex<HashMap<MessageId, Vec<AttachmentDescriptor>>>,
    calls: Mutex<Vec<Call>>,
    pub fail_body: AtomicBool,
}

impl MockStore {
    pub fn insert(&self, record: MessageRecord, body: Option<BodyContent>) {
        let id = record.id;
        self.messages.lock().unwrap().insert(id, record);
        if let Some(body) = body {
            self.bodies.lock().unwrap().insert(id, body);
        }
    }

    pub fn add_attachment(&self, attachment: AttachmentDescriptor) {
        self.attachments
            .lock()
            .unwrap()
            .entry(attachment.message_id)
            .or_default()
            .push(attachment);
    }

    pub fn mark_complete(&self, id: MessageId) {
        if let Some(record) = self.messages.lock().unwrap().get_mut(&id) {
            record.completeness = LoadCompleteness::Complete;
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContentStore for MockStore {
    async fn load_message(&self, id: MessageId) -> Result<Option<MessageRecord>> {
        self.record(Call::Message(id));
        Ok(self.messages.lock().unwrap().get(&id).cloned())
    }

    async fn load_body(&self, id: MessageId) -> Result<Option<BodyContent>> {
        self.record(Call::Body(id));
        if self.fail_body.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("disk on fire")));
        }
        Ok(self.bodies.lock().unwrap().get(&id).cloned())
    }

    async fn load_attachments(&self, id: MessageId) -> Result<Vec<AttachmentDescriptor>> {
        self.record(Call::Attachments(id));
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn load_attachment(&self, id: AttachmentId) -> Result<Option<AttachmentDescriptor>> {
        self.record(Call::Attachment(id));
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn set_read(&self, id: MessageId, is_read: bool) -> Result<()> {
        self.record(Call::SetRead(id, is_read));
        Ok(())
    }

    async fn set_favorite(&self, id: MessageId, is_favorite: bool) -> Result<()> {
        self.record(Call::SetFavorite(id, is_favorite));
        Ok(())
    }

    async fn delete_message(&self, id: MessageId) -> Result<()> {
        self.record(Call::Delete(id));
        self.messages.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockFetcher {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn FetchListener>)>>,
    next_listener: Mutex<u64>,
    pub full_loads: Mutex<Vec<MessageId>>,
    pub attachment_requests: Mutex<Vec<(AttachmentId, MessageId)>>,
    pub cancelled: Mutex<Vec<AttachmentId>>,
    pub invite_responses: Mutex<Vec<(MessageId, MeetingResponse)>>,
}

impl MockFetcher {
    fn listeners(&self) -> Vec<Arc<dyn FetchListener>> {
        self.listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn notify_message(&self, id: MessageId, progress: FetchProgress) {
        for listener in self.listeners() {
            listener.load_message_progress(id, progress.clone());
        }
    }

    pub fn notify_attachment(&self, owner: MessageId, id: AttachmentId, progress: FetchProgress) {
        for listener in self.listeners() {
            listener.load_attachment_progress(owner, id, progress.clone());
        }
    }

    pub fn full_loads(&self) -> Vec<MessageId> {
        self.full_loads.lock().unwrap().clone()
    }

    pub fn attachment_requests(&self) -> Vec<(AttachmentId, MessageId)> {
        self.attachment_requests.lock().unwrap().clone()
    }

    pub fn invite_responses(&self) -> Vec<(MessageId, MeetingResponse)> {
        self.invite_responses.lock().unwrap().clone()
    }
}

impl RemoteFetcher for MockFetcher {
    fn add_listener(&self, listener: Arc<dyn FetchListener>) -> ListenerId {
        let mut next = self.next_listener.lock().unwrap();
        *next += 1;
        let id = ListenerId(*next);
        self.listeners.lock().unwrap().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().unwrap().retain(|(l, _)| *l != id);
    }

    fn request_full_load(&self, message_id: MessageId) {
        self.full_loads.lock().unwrap().push(message_id);
    }

    fn request_attachment(&self, attachment_id: AttachmentId, owner: MessageId) {
        self.attachment_requests
            .lock()
            .unwrap()
            .push((attachment_id, owner));
    }

    fn cancel_attachment(&self, attachment_id: AttachmentId) {
        self.cancelled.lock().unwrap().push(attachment_id);
    }

    fn send_meeting_response(&self, message_id: MessageId, response: MeetingResponse) {
        self.invite_responses
            .lock()
            .unwrap()
            .push((message_id, response));
    }
}

pub struct MockSink {
    pub storage: AtomicBool,
    pub saved: Mutex<Vec<AttachmentId>>,
    pub opened: Mutex<Vec<AttachmentId>>,
}

impl Default for MockSink {
    fn default() -> Self {
        Self {
            storage: AtomicBool::new(true),
            saved: Mutex::default(),
            opened: Mutex::default(),
        }
    }
}

#[async_trait]
impl AttachmentSink for MockSink {
    fn storage_available(&self) -> bool {
        self.storage.load(Ordering::SeqCst)
    }

    async fn save(&self, attachment: &AttachmentDescriptor) -> Result<PathBuf> {
        self.saved.lock().unwrap().push(attachment.id);
        Ok(PathBuf::from("/downloads").join(&attachment.name))
    }

    async fn open(&self, attachment: &AttachmentDescriptor) -> Result<()> {
        self.opened.lock().unwrap().push(attachment.id);
        Ok(())
    }
}

/// A coordinator wired to mocks.
pub struct Harness {
    pub coordinator: LoadCoordinator,
    pub events: UnboundedReceiver<ViewEvent>,
    pub store: Arc<MockStore>,
    pub fetcher: Arc<MockFetcher>,
    pub sink: Arc<MockSink>,
}

impl Harness {
    pub fn new(store: MockStore, order: Option<Vec<MessageId>>) -> Self {
        Self::with_sink(store, order, MockSink::default())
    }

    pub fn with_sink(store: MockStore, order: Option<Vec<MessageId>>, sink: MockSink) -> Self {
        let store = Arc::new(store);
        let fetcher = Arc::new(MockFetcher::default());
        let sink = Arc::new(sink);
        let collaborators = Collaborators {
            store: Arc::clone(&store) as Arc<dyn ContentStore>,
            fetcher: Arc::clone(&fetcher) as Arc<dyn RemoteFetcher>,
            sink: Arc::clone(&sink) as Arc<dyn AttachmentSink>,
            cursor: order.map(|ids| Box::new(MessageOrder::new(ids)) as _),
        };
        let (coordinator, events) = LoadCoordinator::new(collaborators, ViewerSettings::default());
        Self {
            coordinator,
            events,
            store,
            fetcher,
            sink,
        }
    }

    /// Applies inputs until none arrive for a short while.
    pub async fn settle(&mut self) {
        while let Ok(true) =
            tokio::time::timeout(Duration::from_millis(50), self.coordinator.step()).await
        {}
    }

    /// Events emitted since the last call.
    pub fn drain(&mut self) -> Vec<ViewEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn record(id: i64, completeness: LoadCompleteness) -> MessageRecord {
    MessageRecord {
        id: MessageId(id),
        mailbox_id: MailboxId(1),
        account_id: AccountId(1),
        completeness,
        is_favorite: false,
        is_read: false,
        from: "Alice <alice@example.com>".to_string(),
        to: "bob@example.com".to_string(),
        cc: String::new(),
        subject: format!("Message {id}"),
        timestamp: Utc.with_ymd_and_hms(2026, 1, 24, 10, 0, 0).unwrap(),
        has_attachments: false,
        meeting: None,
    }
}

pub fn html(html: &str) -> BodyContent {
    BodyContent {
        text: None,
        html: Some(html.to_string()),
    }
}

pub fn attachment(
    id: i64,
    message_id: i64,
    name: &str,
    content_id: Option<&str>,
    location: Option<&str>,
) -> AttachmentDescriptor {
    AttachmentDescriptor {
        id: AttachmentId(id),
        message_id: MessageId(message_id),
        name: name.to_string(),
        size: 1024,
        content_type: "application/octet-stream".to_string(),
        content_id: content_id.map(str::to_string),
        content_location: location.map(str::to_string),
    }
}

pub fn position<F: Fn(&ViewEvent) -> bool>(events: &[ViewEvent], pred: F) -> Option<usize> {
    events.iter().position(pred)
}
