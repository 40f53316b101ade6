//! Focus tokens and the fence that decides which one is live.
//!
//! Every background load is tagged with the token that was live when it was
//! issued. Results are applied only while that token is still live; anything
//! else is a stale result and is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one focus session. Exactly one token is live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusToken(u64);

impl FocusToken {
    /// Raw counter value, for logging.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FocusToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues focus tokens and answers whether a token is still live.
///
/// Only the coordinator advances the fence. Clones handed to background tasks
/// are read-only in practice and let a task give up early once superseded.
#[derive(Debug, Clone, Default)]
pub struct FocusFence {
    current: Arc<AtomicU64>,
}

impl FocusFence {
    /// Creates a fence with no live focus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token, invalidating the previous one.
    pub fn advance(&self) -> FocusToken {
        FocusToken(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Invalidates the live token without issuing a new focus.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    /// Whether `token` is the live token.
    #[must_use]
    pub fn is_live(&self, token: FocusToken) -> bool {
        self.current.load(Ordering::Acquire) == token.0
    }
}
