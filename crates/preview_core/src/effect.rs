use crate::{PreviewResult, RunToken, SourceText};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Arm (or re-arm) the trailing-edge debounce timer.
    ScheduleRun,
    /// Execute the transform chain against `source`.
    StartRun { token: RunToken, source: SourceText },
    /// Hand the accepted result to observers.
    Publish {
        token: RunToken,
        result: PreviewResult,
    },
    /// A finished run was not accepted.
    Discard {
        token: RunToken,
        reason: DiscardReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// A newer run started before this one finished.
    Stale { current: RunToken },
    /// The token was never started or was already published.
    UnknownRun,
}
