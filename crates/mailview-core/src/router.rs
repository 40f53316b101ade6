//! Routes remote fetch notifications back to the coordinator.
//!
//! The fetcher calls its listeners from whatever thread it likes. The router's
//! listener never touches view state: it checks the notification against the
//! current routing table and, if it belongs to the displayed message, queues
//! an [`Input`] for the coordinator. Everything else is dropped.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;

use crate::coordinator::Input;
use crate::model::{AttachmentId, MessageId};
use crate::token::FocusToken;
use crate::traits::{FetchListener, FetchProgress, ListenerId, RemoteFetcher};

/// Routing table shared between the coordinator and the listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Routes {
    /// Present while registered with a fetcher.
    listener: Option<ListenerId>,
    /// Message whose full load the view is waiting on.
    full_load: Option<(MessageId, FocusToken)>,
    /// Message currently displayed.
    focus: Option<(MessageId, FocusToken)>,
}

/// Owns the routing table and the listener registration.
#[derive(Debug)]
pub struct CallbackRouter {
    routes: watch::Sender<Routes>,
    listener: Arc<RouterListener>,
}

impl CallbackRouter {
    /// Creates an unregistered router forwarding into `inputs`.
    #[must_use]
    pub fn new(inputs: UnboundedSender<Input>) -> Self {
        let (routes, rx) = watch::channel(Routes::default());
        Self {
            routes,
            listener: Arc::new(RouterListener { routes: rx, inputs }),
        }
    }

    /// Registers with `fetcher`. Does nothing if already registered.
    pub fn register(&self, fetcher: &dyn RemoteFetcher) {
        if self.is_registered() {
            return;
        }
        let id = fetcher.add_listener(self.listener());
        self.routes.send_modify(|routes| routes.listener = Some(id));
        tracing::debug!("Registered fetch listener {:?}", id);
    }

    /// Unregisters from `fetcher`. Does nothing if not registered.
    ///
    /// Notifications arriving afterwards are dropped.
    pub fn unregister(&self, fetcher: &dyn RemoteFetcher) {
        let mut removed = None;
        self.routes
            .send_modify(|routes| removed = routes.listener.take());
        if let Some(id) = removed {
            fetcher.remove_listener(id);
            tracing::debug!("Unregistered fetch listener {:?}", id);
        }
    }

    /// Whether a registration is active.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.routes.borrow().listener.is_some()
    }

    /// Forward full-load progress for `id` under `token`.
    pub fn expect_full_load(&self, id: MessageId, token: FocusToken) {
        self.routes
            .send_modify(|routes| routes.full_load = Some((id, token)));
    }

    /// Stop forwarding full-load progress.
    pub fn clear_full_load(&self) {
        self.routes.send_modify(|routes| routes.full_load = None);
    }

    /// Forward attachment progress for `id` under `token`.
    pub fn set_focus(&self, id: MessageId, token: FocusToken) {
        self.routes.send_modify(|routes| routes.focus = Some((id, token)));
    }

    /// Forget the displayed message and any expected full load.
    pub fn clear_focus(&self) {
        self.routes.send_modify(|routes| {
            routes.focus = None;
            routes.full_load = None;
        });
    }

    /// The listener handed to the fetcher.
    #[must_use]
    pub fn listener(&self) -> Arc<dyn FetchListener> {
        Arc::clone(&self.listener) as Arc<dyn FetchListener>
    }
}

/// The [`FetchListener`] registered with the fetcher.
#[derive(Debug)]
struct RouterListener {
    routes: watch::Receiver<Routes>,
    inputs: UnboundedSender<Input>,
}

impl RouterListener {
    fn forward(&self, input: Input) {
        if self.inputs.send(input).is_err() {
            tracing::trace!("Coordinator stopped; dropping fetch notification");
        }
    }
}

impl FetchListener for RouterListener {
    fn load_message_progress(&self, message_id: MessageId, progress: FetchProgress) {
        let Some(phase) = progress.phase() else {
            return;
        };
        let routes = *self.routes.borrow();
        if routes.listener.is_none() {
            tracing::trace!("Dropping message progress for {} after unregister", message_id);
            return;
        }
        match routes.full_load {
            Some((expected, token)) if expected == message_id => {
                if let FetchProgress::Error(reason) = &progress {
                    tracing::warn!("Remote fetch of {} failed: {}", message_id, reason);
                }
                self.forward(Input::RemoteFetchProgress { token, phase });
            }
            _ => tracing::trace!("Dropping message progress for unexpected {}", message_id),
        }
    }

    fn load_attachment_progress(
        &self,
        message_id: MessageId,
        attachment_id: AttachmentId,
        progress: FetchProgress,
    ) {
        let Some(phase) = progress.phase() else {
            return;
        };
        let routes = *self.routes.borrow();
        if routes.listener.is_none() {
            tracing::trace!("Dropping attachment progress for {} after unregister", attachment_id);
            return;
        }
        match routes.focus {
            Some((focused, token)) if focused == message_id => {
                self.forward(Input::AttachmentFetchProgress {
                    token,
                    attachment_id,
                    phase,
                });
            }
            _ => tracing::trace!(
                "Dropping attachment progress for {} of unfocused {}",
                attachment_id,
                message_id
            ),
        }
    }
}
