use std::fmt;
use std::time::Duration;

/// Poll loop state
///
/// `Idle → FetchingHomepage → ProcessingLinks → Sleeping → Idle`, with
/// `FailureBackoff` reachable from `FetchingHomepage` or from any unexpected
/// error at the iteration boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Between iterations, about to start a poll
    Idle,

    /// Requesting the homepage
    FetchingHomepage,

    /// Extracting, filtering and processing article links
    ProcessingLinks,

    /// Waiting out the scan interval after a completed poll
    Sleeping(Duration),

    /// Waiting out a backoff after a failed poll
    FailureBackoff(Duration),
}

impl PollState {
    /// Returns the wait associated with this state, if any
    pub fn wait(&self) -> Option<Duration> {
        match self {
            Self::Sleeping(d) | Self::FailureBackoff(d) => Some(*d),
            _ => None,
        }
    }

    /// Checks if a transition from this state to another is valid
    pub fn can_transition_to(&self, target: PollState) -> bool {
        use PollState::*;

        matches!(
            (*self, target),
            (Idle, FetchingHomepage)
                | (FetchingHomepage, ProcessingLinks)
                | (FetchingHomepage, FailureBackoff(_))
                | (ProcessingLinks, Sleeping(_))
                | (ProcessingLinks, FailureBackoff(_))
                | (Sleeping(_), Idle)
                | (FailureBackoff(_), Idle)
        )
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::FetchingHomepage => write!(f, "fetching_homepage"),
            Self::ProcessingLinks => write!(f, "processing_links"),
            Self::Sleeping(d) => write!(f, "sleeping({}s)", d.as_secs()),
            Self::FailureBackoff(d) => write!(f, "failure_backoff({}s)", d.as_secs()),
        }
    }
}
