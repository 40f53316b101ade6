//! The load coordinator.
//!
//! Owns the focused message and sequences its loading in three stages:
//!
//! 1. metadata (with an optional remote fetch when the message is incomplete)
//! 2. body
//! 3. attachments, followed by inline-image substitution
//!
//! The coordinator runs on a single task. Store reads run on spawned tasks
//! tagged with the [`FocusToken`] live when they were issued, and report back
//! through the input channel. A result is applied only if its token is still
//! live and the pipeline is at the stage that asked for it; everything else is
//! dropped.

mod download;
mod event;
mod input;
mod state;
mod tasks;

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub use download::{ActionError, DownloadOutcome};
pub use event::{ProgressKind, TransientErrorKind, ViewEvent};
pub use input::{Input, ViewCommand, ViewHandle};
pub use state::LoadStageState;
use tasks::{StageTasks, spawn_fenced, spawn_write};

use crate::config::ViewerSettings;
use crate::inline::substitute_inline_images;
use crate::model::{
    AttachmentDescriptor, AttachmentId, AttachmentIntent, BodyContent, ListedAttachment,
    MeetingResponse, MessageId, MessageRecord, PendingDownload, RenderedBody,
};
use crate::router::CallbackRouter;
use crate::token::{FocusFence, FocusToken};
use crate::traits::{AttachmentSink, ContentStore, FetchPhase, NavigationCursor, RemoteFetcher};
use crate::{LoadError, Result};

/// External services the coordinator drives.
pub struct Collaborators {
    /// Local message store.
    pub store: Arc<dyn ContentStore>,
    /// Remote fetch service.
    pub fetcher: Arc<dyn RemoteFetcher>,
    /// Destination for saved and opened attachments.
    pub sink: Arc<dyn AttachmentSink>,
    /// Position within the mailbox, if the view was opened from a list.
    pub cursor: Option<Box<dyn NavigationCursor>>,
}

/// The message currently being shown.
#[derive(Debug, Clone, Copy)]
struct Focus {
    id: MessageId,
    token: FocusToken,
    allow_remote_fetch: bool,
}

/// Sequences the loading of the focused message.
pub struct LoadCoordinator {
    store: Arc<dyn ContentStore>,
    fetcher: Arc<dyn RemoteFetcher>,
    sink: Arc<dyn AttachmentSink>,
    cursor: Option<Box<dyn NavigationCursor>>,
    settings: ViewerSettings,
    router: CallbackRouter,
    fence: FocusFence,
    inputs_tx: UnboundedSender<Input>,
    inputs_rx: UnboundedReceiver<Input>,
    events: UnboundedSender<ViewEvent>,
    focus: Option<Focus>,
    state: LoadStageState,
    message: Option<MessageRecord>,
    /// Rendered body before any inline substitution.
    body: Option<RenderedBody>,
    display_html: Option<String>,
    attachments: Vec<ListedAttachment>,
    pending: Option<PendingDownload>,
    pictures_shown: bool,
    /// Last invitation reply sent, to avoid repeating it.
    invite_response: Option<(MessageId, MeetingResponse)>,
    tasks: StageTasks,
    closed: bool,
}

impl LoadCoordinator {
    /// Creates a coordinator and registers its router with the fetcher.
    ///
    /// Returns the coordinator and the receiving end of its event stream.
    #[must_use]
    pub fn new(
        collaborators: Collaborators,
        settings: ViewerSettings,
    ) -> (Self, UnboundedReceiver<ViewEvent>) {
        let (inputs_tx, inputs_rx) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();
        let router = CallbackRouter::new(inputs_tx.clone());
        router.register(collaborators.fetcher.as_ref());

        let coordinator = Self {
            store: collaborators.store,
            fetcher: collaborators.fetcher,
            sink: collaborators.sink,
            cursor: collaborators.cursor,
            settings,
            router,
            fence: FocusFence::new(),
            inputs_tx,
            inputs_rx,
            events,
            focus: None,
            state: LoadStageState::Idle,
            message: None,
            body: None,
            display_html: None,
            attachments: Vec::new(),
            pending: None,
            pictures_shown: false,
            invite_response: None,
            tasks: StageTasks::default(),
            closed: false,
        };
        (coordinator, events_rx)
    }

    /// Handle for sending commands from other tasks.
    #[must_use]
    pub fn handle(&self) -> ViewHandle {
        ViewHandle::new(self.inputs_tx.clone())
    }

    /// The router forwarding fetch notifications to this coordinator.
    #[must_use]
    pub const fn router(&self) -> &CallbackRouter {
        &self.router
    }

    /// Stage of the focused message.
    #[must_use]
    pub const fn state(&self) -> LoadStageState {
        self.state
    }

    /// Focused message id.
    #[must_use]
    pub fn focused(&self) -> Option<MessageId> {
        self.focus.map(|f| f.id)
    }

    /// Token of the current focus.
    #[must_use]
    pub fn current_token(&self) -> Option<FocusToken> {
        self.focus.map(|f| f.token)
    }

    /// Metadata snapshot of the focused message.
    #[must_use]
    pub const fn message(&self) -> Option<&MessageRecord> {
        self.message.as_ref()
    }

    /// HTML currently displayed, after inline substitution.
    #[must_use]
    pub fn display_html(&self) -> Option<&str> {
        self.display_html.as_deref()
    }

    /// Attachments offered to the user.
    #[must_use]
    pub fn attachments(&self) -> &[ListedAttachment] {
        &self.attachments
    }

    /// The outstanding attachment request, if any.
    #[must_use]
    pub const fn pending_download(&self) -> Option<&PendingDownload> {
        self.pending.as_ref()
    }

    /// Whether the view has been torn down.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Applies inputs until the view is closed.
    pub async fn run(mut self) {
        while self.step().await {}
        tracing::debug!("Load coordinator stopped");
    }

    /// Waits for one input and applies it. Returns `false` once closed.
    pub async fn step(&mut self) -> bool {
        if self.closed {
            return false;
        }
        match self.inputs_rx.recv().await {
            Some(input) => {
                self.dispatch(input);
                !self.closed
            }
            None => false,
        }
    }

    /// Applies one input.
    pub fn dispatch(&mut self, input: Input) {
        match input {
            Input::Command(command) => self.apply_command(command),
            Input::MetadataLoaded { token, result } => self.on_metadata_loaded(token, result),
            Input::BodyLoaded { token, result } => self.on_body_loaded(token, result),
            Input::AttachmentsLoaded { token, result } => {
                self.on_attachments_loaded(token, result);
            }
            Input::RemoteFetchProgress { token, phase } => {
                self.on_remote_fetch_progress(token, phase);
            }
            Input::AttachmentFetchProgress {
                token,
                attachment_id,
                phase,
            } => self.on_attachment_fetch_progress(token, attachment_id, phase),
            Input::DownloadFinished {
                attachment_id,
                result,
            } => self.on_download_finished(attachment_id, result),
        }
    }

    fn apply_command(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::Focus {
                id,
                allow_remote_fetch,
            } => self.focus(id, allow_remote_fetch),
            ViewCommand::MoveOlder => {
                self.move_older();
            }
            ViewCommand::MoveNewer => {
                self.move_newer();
            }
            ViewCommand::ToggleFavorite => self.toggle_favorite(),
            ViewCommand::MarkUnread => self.mark_unread(),
            ViewCommand::Delete => self.delete_focused(),
            ViewCommand::AttachmentAction { id, intent } => {
                if let Err(e) = self.request_attachment_action(id, intent) {
                    tracing::debug!("Attachment action refused: {}", e);
                }
            }
            ViewCommand::ShowPictures => {
                self.show_pictures();
            }
            ViewCommand::RespondToInvite(response) => {
                self.respond_to_invite(response);
            }
            ViewCommand::CursorMessageNotFound => self.on_cursor_message_not_found(),
            ViewCommand::CursorMessagesChanged => self.on_cursor_messages_changed(),
            ViewCommand::Pause => self.pause(),
            ViewCommand::Resume => self.resume(),
            ViewCommand::Close => self.close(),
        }
    }

    // ========== Focus and stages ==========

    /// Shows message `id`, superseding whatever was loading.
    ///
    /// Returns immediately; the stages report back through the input channel.
    pub fn focus(&mut self, id: MessageId, allow_remote_fetch: bool) {
        if self.closed {
            tracing::debug!("Ignoring focus on {} after close", id);
            return;
        }

        self.tasks.abort_all();
        if self.state.is_loading() {
            tracing::debug!("Aborting {:?} for previous focus", self.state);
        }

        let token = self.fence.advance();
        tracing::debug!(%token, "Focusing message {}", id);

        self.message = None;
        self.body = None;
        self.display_html = None;
        self.attachments.clear();
        self.pending = None;
        self.pictures_shown = false;
        self.router.clear_full_load();
        self.router.set_focus(id, token);
        self.focus = Some(Focus {
            id,
            token,
            allow_remote_fetch,
        });

        self.emit(ViewEvent::Reset);
        self.start_metadata(id, token);
        self.emit_navigation();
    }

    /// Applies the result of stage 1.
    pub fn on_metadata_loaded(
        &mut self,
        token: FocusToken,
        result: std::result::Result<MessageRecord, LoadError>,
    ) {
        let Some(focus) = self.live_focus(token, LoadStageState::MetadataLoading) else {
            return;
        };
        self.tasks.metadata = None;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Message {} unavailable: {}", focus.id, e);
                self.abandon();
                return;
            }
        };

        if let Some(cursor) = self.cursor.as_mut()
            && !cursor.move_to(focus.id)
        {
            tracing::debug!("Message {} is not in the navigation order", focus.id);
        }

        let complete = record.completeness.is_complete();
        self.message = Some(record.clone());
        self.emit(ViewEvent::MetadataReady(record));
        self.emit_navigation();

        if complete || !(focus.allow_remote_fetch && self.settings.allow_remote_fetch) {
            self.start_body(focus.id, token);
        } else {
            tracing::info!("Message {} incomplete, requesting full load", focus.id);
            self.router.expect_full_load(focus.id, token);
            self.state = LoadStageState::RemoteFetchWaiting;
            self.fetcher.request_full_load(focus.id);
        }
    }

    /// Applies a routed full-load milestone.
    pub fn on_remote_fetch_progress(&mut self, token: FocusToken, phase: FetchPhase) {
        let Some(focus) = self.live_focus(token, LoadStageState::RemoteFetchWaiting) else {
            return;
        };

        match phase {
            FetchPhase::Started => {
                self.emit(ViewEvent::Progress(ProgressKind::RemoteFetch, true));
                self.emit(ViewEvent::PlaceholderBody(
                    self.settings.loading_placeholder_uri.clone(),
                ));
            }
            FetchPhase::Done => {
                tracing::info!("Full load of {} done, reloading", focus.id);
                self.router.clear_full_load();
                self.emit(ViewEvent::Progress(ProgressKind::RemoteFetch, false));
                self.tasks.abort_all();
                if let Some(f) = self.focus.as_mut() {
                    f.allow_remote_fetch = false;
                }
                self.start_metadata(focus.id, token);
            }
            FetchPhase::Failed => {
                self.router.clear_full_load();
                self.emit(ViewEvent::Progress(ProgressKind::RemoteFetch, false));
                self.emit(ViewEvent::TransientError(
                    TransientErrorKind::RemoteFetchFailed,
                ));
                self.emit(ViewEvent::PlaceholderBody(
                    self.settings.empty_placeholder_uri.clone(),
                ));
                self.state = LoadStageState::Ready;
            }
        }
    }

    /// Applies the result of stage 2.
    pub fn on_body_loaded(
        &mut self,
        token: FocusToken,
        result: std::result::Result<BodyContent, LoadError>,
    ) {
        let Some(focus) = self.live_focus(token, LoadStageState::BodyLoading) else {
            return;
        };
        self.tasks.body = None;

        let body = match result {
            Ok(body) => body,
            Err(LoadError::NotFound) => {
                tracing::warn!("No body stored for message {}", focus.id);
                self.abandon();
                return;
            }
            Err(e) => {
                tracing::warn!("Failed to load body of {}: {}", focus.id, e);
                self.emit(ViewEvent::TransientError(TransientErrorKind::BodyLoadFailed));
                self.state = LoadStageState::Ready;
                return;
            }
        };

        let rendered = body.render();
        self.display_html = Some(rendered.html.clone());
        self.emit(ViewEvent::BodyReady {
            html: rendered.html.clone(),
            has_images: rendered.has_images,
        });
        self.body = Some(rendered);

        if let Some(message) = self.message.as_mut()
            && !message.is_read
        {
            message.is_read = true;
            let id = focus.id;
            spawn_write(&self.store, "mark message read", move |store| async move {
                store.set_read(id, true).await
            });
        }

        self.state = LoadStageState::AttachmentsLoading;
        let store = Arc::clone(&self.store);
        let id = focus.id;
        self.tasks.attachments = Some(spawn_fenced(
            &self.fence,
            token,
            &self.inputs_tx,
            async move { store.load_attachments(id).await.map_err(LoadError::from) },
            move |result| Input::AttachmentsLoaded { token, result },
        ));
    }

    /// Applies the result of stage 3.
    pub fn on_attachments_loaded(
        &mut self,
        token: FocusToken,
        result: std::result::Result<Vec<AttachmentDescriptor>, LoadError>,
    ) {
        let Some(focus) = self.live_focus(token, LoadStageState::AttachmentsLoading) else {
            return;
        };
        self.tasks.attachments = None;
        self.state = LoadStageState::Ready;

        let descriptors = match result {
            Ok(descriptors) => descriptors,
            Err(e) => {
                tracing::warn!("Failed to load attachments of {}: {}", focus.id, e);
                self.emit(ViewEvent::TransientError(
                    TransientErrorKind::AttachmentsLoadFailed,
                ));
                return;
            }
        };

        let pristine = self
            .body
            .as_ref()
            .filter(|body| body.is_html)
            .map(|body| body.html.as_str());
        let outcome = substitute_inline_images(pristine, &descriptors);
        let has_images = self.body.as_ref().is_some_and(|body| body.has_images);

        if outcome.changed
            && let Some(html) = outcome.html
        {
            self.display_html = Some(html.clone());
            self.emit(ViewEvent::BodyReady { html, has_images });
        }

        let policy = &self.settings.attachment_policy;
        let listed: Vec<ListedAttachment> =
            outcome.listed.iter().map(|d| policy.classify(d)).collect();
        for attachment in &listed {
            self.emit(ViewEvent::AttachmentAvailable(attachment.clone()));
        }
        if !listed.is_empty() {
            self.emit(ViewEvent::AttachmentListChanged);
        }
        self.attachments = listed;

        tracing::info!(
            "Message {} ready: {} inline, {} listed",
            focus.id,
            outcome.inline.len(),
            self.attachments.len()
        );
    }

    fn start_metadata(&mut self, id: MessageId, token: FocusToken) {
        self.state = LoadStageState::MetadataLoading;
        let store = Arc::clone(&self.store);
        self.tasks.metadata = Some(spawn_fenced(
            &self.fence,
            token,
            &self.inputs_tx,
            async move { found(store.load_message(id).await) },
            move |result| Input::MetadataLoaded { token, result },
        ));
    }

    fn start_body(&mut self, id: MessageId, token: FocusToken) {
        self.state = LoadStageState::BodyLoading;
        let store = Arc::clone(&self.store);
        self.tasks.body = Some(spawn_fenced(
            &self.fence,
            token,
            &self.inputs_tx,
            async move { found(store.load_body(id).await) },
            move |result| Input::BodyLoaded { token, result },
        ));
    }

    /// The focus `token` belongs to, if it is live and at `expected`.
    fn live_focus(&self, token: FocusToken, expected: LoadStageState) -> Option<Focus> {
        let focus = self.focus.filter(|f| f.token == token);
        match focus {
            Some(focus) if !self.closed && self.fence.is_live(token) => {
                if self.state == expected {
                    Some(focus)
                } else {
                    tracing::debug!(%token, "Dropping result for {:?} in {:?}", expected, self.state);
                    None
                }
            }
            _ => {
                tracing::debug!(%token, "Dropping stale result for {:?}", expected);
                None
            }
        }
    }

    fn abandon(&mut self) {
        self.tasks.abort_all();
        self.state = LoadStageState::Aborted;
        self.emit(ViewEvent::AbandonView);
    }

    // ========== Attachments ==========

    /// Fetches an attachment so it can be saved or opened.
    ///
    /// Replaces any outstanding request; only the latest one completes.
    ///
    /// # Errors
    ///
    /// - [`ActionError::NoStorage`] for a save with no storage available. The
    ///   fetcher is not contacted.
    /// - [`ActionError::NoFocus`] when nothing is focused.
    /// - [`ActionError::UnknownAttachment`] when `id` is not listed.
    pub fn request_attachment_action(
        &mut self,
        id: AttachmentId,
        intent: AttachmentIntent,
    ) -> std::result::Result<(), ActionError> {
        if intent == AttachmentIntent::Save && !self.sink.storage_available() {
            self.emit(ViewEvent::TransientError(TransientErrorKind::NoStorage));
            return Err(ActionError::NoStorage);
        }

        let focus = match self.focus {
            Some(focus) if !self.closed => focus,
            _ => return Err(ActionError::NoFocus),
        };

        let Some(attachment) = self.attachments.iter().find(|a| a.descriptor.id == id) else {
            return Err(ActionError::UnknownAttachment(id));
        };

        if let Some(previous) = &self.pending
            && previous.attachment_id != id
        {
            tracing::debug!("Superseding pending download of {}", previous.attachment_id);
        }
        self.pending = Some(PendingDownload {
            attachment_id: id,
            intent,
            name: attachment.descriptor.name.clone(),
        });
        self.fetcher.request_attachment(id, focus.id);
        Ok(())
    }

    /// Applies a routed attachment download milestone.
    pub fn on_attachment_fetch_progress(
        &mut self,
        token: FocusToken,
        attachment_id: AttachmentId,
        phase: FetchPhase,
    ) {
        if self.closed
            || !self.fence.is_live(token)
            || self.focus.is_none_or(|f| f.token != token)
        {
            tracing::debug!(%token, "Dropping stale progress for attachment {}", attachment_id);
            return;
        }

        let name = self.attachment_name(attachment_id);
        match phase {
            FetchPhase::Started => {
                self.emit(ViewEvent::AttachmentControlsEnabled(false));
                self.emit(ViewEvent::Progress(
                    ProgressKind::AttachmentFetch { name },
                    true,
                ));
            }
            FetchPhase::Done => {
                self.emit(ViewEvent::AttachmentControlsEnabled(true));
                self.emit(ViewEvent::Progress(
                    ProgressKind::AttachmentFetch { name },
                    false,
                ));
                self.emit(ViewEvent::AttachmentThumbnailUpdated(attachment_id));

                match self.pending.take_if(|p| p.attachment_id == attachment_id) {
                    Some(pending) => self.spawn_completion(pending),
                    None => tracing::debug!("Attachment {} is not the pending download", attachment_id),
                }
            }
            FetchPhase::Failed => {
                self.emit(ViewEvent::AttachmentControlsEnabled(true));
                self.emit(ViewEvent::Progress(
                    ProgressKind::AttachmentFetch { name },
                    false,
                ));
                self.emit(ViewEvent::TransientError(
                    TransientErrorKind::AttachmentFetchFailed,
                ));
                if self
                    .pending
                    .take_if(|p| p.attachment_id == attachment_id)
                    .is_some()
                {
                    tracing::debug!("Dropped pending download of {}", attachment_id);
                }
            }
        }
    }

    /// Reports the result of a save or open.
    pub fn on_download_finished(
        &mut self,
        attachment_id: AttachmentId,
        result: std::result::Result<DownloadOutcome, TransientErrorKind>,
    ) {
        if self.closed {
            return;
        }
        match result {
            Ok(DownloadOutcome::Saved(path)) => {
                tracing::info!("Attachment {} saved to {:?}", attachment_id, path);
                self.emit(ViewEvent::AttachmentSaved { path });
            }
            Ok(DownloadOutcome::Opened) => {
                self.emit(ViewEvent::AttachmentOpened(attachment_id));
            }
            Err(kind) => self.emit(ViewEvent::TransientError(kind)),
        }
    }

    fn spawn_completion(&self, pending: PendingDownload) {
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let inputs = self.inputs_tx.clone();
        let attachment_id = pending.attachment_id;
        tokio::spawn(async move {
            let result = download::complete(store, sink, attachment_id, pending.intent).await;
            if inputs
                .send(Input::DownloadFinished {
                    attachment_id,
                    result,
                })
                .is_err()
            {
                tracing::trace!("Coordinator stopped before attachment {} finished", attachment_id);
            }
        });
    }

    fn attachment_name(&self, id: AttachmentId) -> String {
        self.pending
            .as_ref()
            .filter(|p| p.attachment_id == id)
            .map(|p| p.name.clone())
            .or_else(|| {
                self.attachments
                    .iter()
                    .find(|a| a.descriptor.id == id)
                    .map(|a| a.descriptor.name.clone())
            })
            .unwrap_or_else(|| id.to_string())
    }

    // ========== Navigation and flags ==========

    /// Focuses the next older message. Returns whether focus moved.
    pub fn move_older(&mut self) -> bool {
        let next = self.cursor.as_mut().and_then(|c| c.move_older());
        self.focus_neighbour(next)
    }

    /// Focuses the next newer message. Returns whether focus moved.
    pub fn move_newer(&mut self) -> bool {
        let next = self.cursor.as_mut().and_then(|c| c.move_newer());
        self.focus_neighbour(next)
    }

    fn focus_neighbour(&mut self, next: Option<MessageId>) -> bool {
        match next {
            Some(id) if !self.closed => {
                self.focus(id, true);
                true
            }
            _ => false,
        }
    }

    /// Flips the favorite flag of the focused message.
    pub fn toggle_favorite(&mut self) {
        let Some(message) = self.message.as_mut() else {
            return;
        };
        message.is_favorite = !message.is_favorite;
        let (id, is_favorite) = (message.id, message.is_favorite);
        self.emit(ViewEvent::FavoriteChanged(is_favorite));
        spawn_write(&self.store, "update favorite flag", move |store| async move {
            store.set_favorite(id, is_favorite).await
        });
    }

    /// Marks the focused message unread again.
    pub fn mark_unread(&mut self) {
        let Some(message) = self.message.as_mut().filter(|m| m.is_read) else {
            return;
        };
        message.is_read = false;
        let id = message.id;
        spawn_write(&self.store, "mark message unread", move |store| async move {
            store.set_read(id, false).await
        });
    }

    /// Redisplays the body with remote images allowed.
    ///
    /// Returns `false` when there is no body with images, or they are already
    /// shown.
    pub fn show_pictures(&mut self) -> bool {
        let has_images = self.body.as_ref().is_some_and(|body| body.has_images);
        if self.closed || self.pictures_shown || !has_images {
            return false;
        }
        let Some(html) = self.display_html.clone() else {
            return false;
        };
        self.pictures_shown = true;
        self.emit(ViewEvent::PicturesShown { html });
        true
    }

    /// Replies to the focused meeting invitation and moves to the next older
    /// message, abandoning the view if there is none.
    ///
    /// The same reply is not sent twice in a row for one message. Returns
    /// `false` if the focused message is not an invitation.
    pub fn respond_to_invite(&mut self, response: MeetingResponse) -> bool {
        let Some(message) = self.message.as_ref().filter(|_| !self.closed) else {
            return false;
        };
        if !message.is_meeting_invite() {
            tracing::debug!("Message {} is not a meeting invitation", message.id);
            return false;
        }

        let id = message.id;
        if self.invite_response == Some((id, response)) {
            tracing::debug!("Already replied {} to {}", response, id);
        } else {
            tracing::info!("Replying {} to invitation {}", response, id);
            self.fetcher.send_meeting_response(id, response);
            self.invite_response = Some((id, response));
        }
        self.emit(ViewEvent::InviteResponseSent(response));

        if !self.move_older() {
            self.abandon();
        }
        true
    }

    /// Deletes the focused message and moves to a neighbour, preferring the
    /// older one. Abandons the view if there is no neighbour.
    pub fn delete_focused(&mut self) {
        let Some(focus) = self.focus.filter(|_| !self.closed) else {
            return;
        };
        let id = focus.id;
        let next = self.cursor.as_mut().and_then(|c| {
            let next = c.move_older().or_else(|| c.move_newer());
            c.remove(id);
            next
        });

        spawn_write(&self.store, "delete message", move |store| async move {
            store.delete_message(id).await
        });
        self.emit(ViewEvent::MessageDeleted(id));
        tracing::info!("Deleted message {}", id);

        match next {
            Some(next) => self.focus(next, true),
            None => self.abandon(),
        }
    }

    /// The navigation source no longer contains the focused message.
    pub fn on_cursor_message_not_found(&mut self) {
        self.abandon();
    }

    /// The navigation source's ordering changed.
    pub fn on_cursor_messages_changed(&self) {
        self.emit_navigation();
    }

    fn emit_navigation(&self) {
        let (can_move_older, can_move_newer) = self
            .cursor
            .as_ref()
            .map_or((false, false), |c| (c.can_move_older(), c.can_move_newer()));
        self.emit(ViewEvent::NavigationChanged {
            can_move_older,
            can_move_newer,
        });
    }

    // ========== Lifecycle ==========

    /// Stops receiving fetch notifications while the view is hidden.
    pub fn pause(&self) {
        self.router.unregister(self.fetcher.as_ref());
    }

    /// Resumes receiving fetch notifications.
    pub fn resume(&self) {
        if !self.closed {
            self.router.register(self.fetcher.as_ref());
        }
    }

    /// Tears the view down.
    ///
    /// Every outstanding result is invalidated, stage tasks are aborted, an
    /// outstanding attachment fetch is cancelled and the router unregisters.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.fence.invalidate();
        self.tasks.abort_all();
        if let Some(pending) = self.pending.take() {
            self.fetcher.cancel_attachment(pending.attachment_id);
        }
        self.router.clear_focus();
        self.router.unregister(self.fetcher.as_ref());
        if !self.state.is_terminal() {
            self.state = LoadStageState::Aborted;
        }
        tracing::debug!("Message view closed");
    }

    fn emit(&self, event: ViewEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("View event receiver dropped");
        }
    }
}

/// Maps a store lookup onto a stage result, treating absence as `NotFound`.
fn found<T>(lookup: Result<Option<T>>) -> std::result::Result<T, LoadError> {
    match lookup {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(LoadError::NotFound),
        Err(e) => Err(e.into()),
    }
}
