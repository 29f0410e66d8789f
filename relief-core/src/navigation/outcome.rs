/// A deep link the dispatcher may try to open.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkCandidate {
    /// URI handed to the platform.
    pub uri: String,
    /// Identifier of the engine the URI targets.
    pub engine: String,
    /// Attempt order; lower ranks are tried first.
    pub rank: usize,
}

/// A candidate whose launch failed on every path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FailedAttempt {
    /// URI that could not be opened.
    pub uri: String,
    /// Combined failure description.
    pub reason: String,
}

/// Result of one [`dispatch`](super::NavigationDispatcher::dispatch) call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchOutcome {
    /// URI that launched, if any did.
    pub succeeded_uri: Option<String>,
    /// Failed launches in attempt order.
    pub attempted: Vec<FailedAttempt>,
    /// Candidates skipped because the platform reported no handler.
    pub skipped: Vec<String>,
}

impl DispatchOutcome {
    /// Whether a navigation app was opened.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.succeeded_uri.is_some()
    }
}
