use std::fmt;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// No queued URLs remain for this run
    FrontierExhausted,

    /// The configured number of network fetches was reached
    MaxPages,

    /// The configured run time elapsed
    MaxTime,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FrontierExhausted => "frontier exhausted",
            Self::MaxPages => "page limit reached",
            Self::MaxTime => "time limit reached",
        };
        f.write_str(text)
    }
}

/// Orchestrator state machine
///
/// `Seed` processes the seed URL unconditionally, `Running` drains the
/// frontier while no stop condition holds, and `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Seed,
    Running,
    Done(StopReason),
}

impl CrawlPhase {
    /// Returns true once the crawl has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Phase after the seed has been processed
    pub fn seeded(self) -> Self {
        match self {
            Self::Seed => Self::Running,
            other => other,
        }
    }

    /// Moves to `Done` with the given reason; `Done` never changes
    pub fn stop(self, reason: StopReason) -> Self {
        match self {
            Self::Done(_) => self,
            _ => Self::Done(reason),
        }
    }

    /// Stop reason, if the crawl is done
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::Done(reason) => Some(*reason),
            _ => None,
        }
    }
}
