//! Per-focus load stage.

/// Where the focused message is in the load pipeline.
///
/// `Idle → MetadataLoading → RemoteFetchWaiting? → BodyLoading →
/// AttachmentsLoading → Ready`, with `Aborted` reachable from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStageState {
    /// Nothing focused yet.
    #[default]
    Idle,
    /// Stage 1: reading the message record.
    MetadataLoading,
    /// Waiting for the remote service to complete the message.
    RemoteFetchWaiting,
    /// Stage 2: reading the body.
    BodyLoading,
    /// Stage 3: reading the attachment list.
    AttachmentsLoading,
    /// Everything for this focus has been applied.
    Ready,
    /// Focus moved away or the view was torn down mid-load.
    Aborted,
}

impl LoadStageState {
    /// Whether no further stage will run for the current focus.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Aborted)
    }

    /// Whether a load is in flight.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        !matches!(self, Self::Idle | Self::Ready | Self::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(LoadStageState::Ready.is_terminal());
        assert!(LoadStageState::Aborted.is_terminal());
        assert!(!LoadStageState::Idle.is_terminal());
        assert!(!LoadStageState::RemoteFetchWaiting.is_terminal());
    }

    #[test]
    fn test_loading_states() {
        assert!(LoadStageState::MetadataLoading.is_loading());
        assert!(LoadStageState::AttachmentsLoading.is_loading());
        assert!(!LoadStageState::Idle.is_loading());
        assert!(!LoadStageState::Ready.is_loading());
    }
}
