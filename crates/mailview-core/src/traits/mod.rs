//! Interfaces to the collaborators the pipeline drives.
//!
//! The coordinator owns none of these; implementations are supplied through
//! [`crate::Collaborators`].

mod attachment_sink;
mod content_store;
mod navigation;
mod remote_fetcher;

pub use attachment_sink::AttachmentSink;
pub use content_store::ContentStore;
pub use navigation::NavigationCursor;
pub use remote_fetcher::{FetchListener, FetchPhase, FetchProgress, ListenerId, RemoteFetcher};
