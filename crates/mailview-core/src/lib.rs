//! # mailview-core
//!
//! Core of the `mailview` single-message viewer.
//!
//! This crate provides:
//! - **Load pipeline** - metadata, body and attachments loaded in stages off the
//!   interactive task, with stale results fenced out by focus tokens
//! - **Callback routing** - remote fetch notifications marshalled back onto the
//!   coordinator and filtered by the message they belong to
//! - **Inline images** - `cid:` references rewritten to attachment locations
//! - **Collaborator traits** - content store, remote fetcher, navigation cursor
//!   and attachment sink, plus `SQLite` and file-system implementations
//!
//! ## Example
//!
//! ```ignore
//! use mailview_core::{Collaborators, LoadCoordinator, MessageId, ViewerSettings};
//!
//! let (mut coordinator, mut events) = LoadCoordinator::new(collaborators, ViewerSettings::default());
//! coordinator.focus(MessageId(42), true);
//! tokio::spawn(coordinator.run());
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod coordinator;
mod error;
pub mod inline;
pub mod model;
pub mod order;
pub mod policy;
pub mod render;
pub mod router;
pub mod sink;
pub mod store;
pub mod token;
pub mod traits;

pub use config::ViewerSettings;
pub use coordinator::{
    ActionError, Collaborators, DownloadOutcome, Input, LoadCoordinator, LoadStageState,
    ProgressKind, TransientErrorKind, ViewCommand, ViewEvent, ViewHandle,
};
pub use error::{Error, LoadError, Result};
pub use inline::{InlineOutcome, substitute_inline_images};
pub use model::{
    AccountId, AttachmentDescriptor, AttachmentId, AttachmentIntent, BodyContent,
    ListedAttachment, LoadCompleteness, MailboxId, MeetingInfo, MeetingResponse, MessageId,
    MessageRecord, PendingDownload, RenderedBody,
};
pub use order::MessageOrder;
pub use policy::AttachmentPolicy;
pub use router::CallbackRouter;
pub use sink::FileSystemSink;
pub use store::SqliteContentStore;
pub use token::{FocusFence, FocusToken};
pub use traits::{
    AttachmentSink, ContentStore, FetchListener, FetchPhase, FetchProgress, ListenerId,
    NavigationCursor, RemoteFetcher,
};
